//! Desktop user interface.
//!
//! - [`app::VpcSettingsApp`] - eframe application shell, persistence and notifications
//! - [`vpc_settings_window::VpcSettingsWindow`] - the VPC settings form
//! - [`window_focus::FocusableWindow`] - common window interface

pub mod app;
pub mod vpc_settings_window;
pub mod window_focus;

pub use app::VpcSettingsApp;
pub use vpc_settings_window::{FormServices, PersistedForm, VpcSettingsWindow};
