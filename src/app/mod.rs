//! Core application modules.
//!
//! # Module Organization
//!
//! - [`vpc_form`] - the VPC settings form controller and its page model
//! - [`device_farm`] - AWS Device Farm client, project catalog and VPC lookup bridge
//! - [`config`] - configuration file and AWS credential settings
//! - [`dashui`] - egui user interface
//! - [`notifications`] - notification bar for user feedback

pub mod config;
pub mod dashui;
pub mod device_farm;
pub mod notifications;
pub mod vpc_form;

pub use dashui::app::VpcSettingsApp;
