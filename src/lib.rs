//! dfvpc - Device Farm VPC settings
//!
//! A desktop panel for the VPC side of AWS Device Farm test runs. Pick a
//! Device Farm project and the panel shows the project's VPC id, subnets and
//! security groups; the VPC endpoint option is offered only to projects that
//! have no VPC configured.
//!
//! # Architecture Overview
//!
//! - **UI Layer** ([`app::dashui`]): egui window rendering the settings page
//! - **Form Logic** ([`app::vpc_form`]): controller deriving the page state from the selected project
//! - **Integration Layer** ([`app::device_farm`]): Device Farm lookups behind the [`app::device_farm::VpcBridge`] seam
//! - **Configuration** ([`app::config`]): region, credentials and form behaviour
//!
//! Lookups run on a shared tokio runtime and report back to the UI thread over
//! channels polled once per frame.

#![warn(clippy::all, rust_2018_idioms)]

// Include logging macros first
#[macro_use]
pub mod logging_macros;

pub mod app;
pub use app::VpcSettingsApp;
