//! Named controls of the VPC settings page.
//!
//! The form controller never reaches for global state: everything it reads or
//! writes lives in a [`FormSurface`], a registry of controls keyed by
//! [`ControlId`]. The settings window renders the same surface, and tests
//! build surfaces by hand to substitute pages with missing or pre-filled
//! controls.

#![warn(clippy::all, rust_2018_idioms)]

use super::error::FormError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifier of a control on the settings page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlId {
    /// VPC endpoint toggle (`ifVpce`)
    VpceToggle,
    /// VPC id text field (`vpcId`)
    VpcId,
    /// Subnet ids text field (`subnetId`)
    SubnetId,
    /// Security group ids text field (`securityGroupId`)
    SecurityGroupId,
    /// Device Farm project selector (`projectSelect`)
    ProjectSelect,
    /// VPCE service name selector (`vpceServiceName`)
    VpceServiceName,
}

impl ControlId {
    /// Name the control carries on the page
    pub fn name(&self) -> &'static str {
        match self {
            ControlId::VpceToggle => "ifVpce",
            ControlId::VpcId => "vpcId",
            ControlId::SubnetId => "subnetId",
            ControlId::SecurityGroupId => "securityGroupId",
            ControlId::ProjectSelect => "projectSelect",
            ControlId::VpceServiceName => "vpceServiceName",
        }
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Load state of a derived text field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldStatus {
    #[default]
    Ready,
    /// A lookup for the current selection is in flight
    Loading,
    /// The last lookup failed; the displayed value was kept as-is
    Unknown(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToggleControl {
    /// User's choice, never touched by the controller
    pub checked: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    pub value: String,
    pub disabled: bool,
    pub status: FieldStatus,
}

impl TextField {
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectControl {
    pub options: Vec<String>,
    pub selected_index: Option<usize>,
    pub disabled: bool,
}

impl SelectControl {
    pub fn with_options(options: Vec<String>) -> Self {
        Self {
            options,
            selected_index: None,
            disabled: false,
        }
    }

    /// Text of the currently highlighted option
    pub fn selected_text(&self) -> Option<&str> {
        self.selected_index
            .and_then(|index| self.options.get(index))
            .map(String::as_str)
    }

    /// Highlight the option with the given text. Returns false when no option matches.
    pub fn select_by_text(&mut self, text: &str) -> bool {
        match self.options.iter().position(|option| option == text) {
            Some(index) => {
                self.selected_index = Some(index);
                true
            }
            None => false,
        }
    }

    /// Replace the option list, keeping the highlighted option when it is still offered.
    pub fn set_options(&mut self, options: Vec<String>) {
        let previous = self.selected_text().map(str::to_owned);
        self.options = options;
        self.selected_index = None;
        if let Some(previous) = previous {
            self.select_by_text(&previous);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Toggle(ToggleControl),
    Text(TextField),
    Select(SelectControl),
}

/// Registry of the controls present on a page
#[derive(Debug, Clone, Default)]
pub struct FormSurface {
    controls: HashMap<ControlId, Control>,
}

impl FormSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full settings page with every control present and empty
    pub fn standard() -> Self {
        Self::new()
            .with_toggle(ControlId::VpceToggle)
            .with_text_field(ControlId::VpcId, "")
            .with_text_field(ControlId::SubnetId, "")
            .with_text_field(ControlId::SecurityGroupId, "")
            .with_select(ControlId::ProjectSelect, Vec::new())
            .with_select(ControlId::VpceServiceName, Vec::new())
    }

    pub fn with_toggle(mut self, id: ControlId) -> Self {
        self.insert(id, Control::Toggle(ToggleControl::default()));
        self
    }

    pub fn with_text_field(mut self, id: ControlId, value: impl Into<String>) -> Self {
        self.insert(id, Control::Text(TextField::with_value(value)));
        self
    }

    pub fn with_select(mut self, id: ControlId, options: Vec<String>) -> Self {
        self.insert(id, Control::Select(SelectControl::with_options(options)));
        self
    }

    pub fn insert(&mut self, id: ControlId, control: Control) {
        self.controls.insert(id, control);
    }

    pub fn remove(&mut self, id: ControlId) -> Option<Control> {
        self.controls.remove(&id)
    }

    pub fn contains(&self, id: ControlId) -> bool {
        self.controls.contains_key(&id)
    }

    pub fn toggle(&self, id: ControlId) -> Result<&ToggleControl, FormError> {
        match self.controls.get(&id) {
            Some(Control::Toggle(toggle)) => Ok(toggle),
            _ => Err(FormError::MissingControl(id)),
        }
    }

    pub fn toggle_mut(&mut self, id: ControlId) -> Result<&mut ToggleControl, FormError> {
        match self.controls.get_mut(&id) {
            Some(Control::Toggle(toggle)) => Ok(toggle),
            _ => Err(FormError::MissingControl(id)),
        }
    }

    pub fn text_field(&self, id: ControlId) -> Result<&TextField, FormError> {
        match self.controls.get(&id) {
            Some(Control::Text(field)) => Ok(field),
            _ => Err(FormError::MissingControl(id)),
        }
    }

    pub fn text_field_mut(&mut self, id: ControlId) -> Result<&mut TextField, FormError> {
        match self.controls.get_mut(&id) {
            Some(Control::Text(field)) => Ok(field),
            _ => Err(FormError::MissingControl(id)),
        }
    }

    pub fn select(&self, id: ControlId) -> Result<&SelectControl, FormError> {
        match self.controls.get(&id) {
            Some(Control::Select(select)) => Ok(select),
            _ => Err(FormError::MissingControl(id)),
        }
    }

    pub fn select_mut(&mut self, id: ControlId) -> Result<&mut SelectControl, FormError> {
        match self.controls.get_mut(&id) {
            Some(Control::Select(select)) => Ok(select),
            _ => Err(FormError::MissingControl(id)),
        }
    }
}
