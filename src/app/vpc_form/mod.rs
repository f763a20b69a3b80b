//! VPC settings form.
//!
//! The form shows the VPC configuration of the selected Device Farm project
//! and offers the VPC endpoint option only to projects without one.
//!
//! - [`controls`] - named controls of the page ([`FormSurface`])
//! - [`controller`] - the [`VpcFormController`] keeping the page in step with the selection
//! - [`options`] - [`FormOptions`] selecting between the full and reduced behaviour
//! - [`error`] - [`FormError`]

#![warn(clippy::all, rust_2018_idioms)]

pub mod controller;
pub mod controls;
pub mod error;
pub mod options;

pub use controller::{endpoint_toggle_disabled, PollOutcome, VpcField, VpcFormController};
pub use controls::{
    Control, ControlId, FieldStatus, FormSurface, SelectControl, TextField, ToggleControl,
};
pub use error::FormError;
pub use options::{FormOptions, SyncMode, TriggerEvent};
