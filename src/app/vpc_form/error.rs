#![warn(clippy::all, rust_2018_idioms)]

use super::controller::VpcField;
use super::controls::ControlId;

/// Errors raised while driving the VPC settings form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// A required control is not present on the page
    MissingControl(ControlId),
    /// The bridge lookup for a field failed or timed out
    FetchFailed {
        field: VpcField,
        project: String,
        reason: String,
    },
    /// A response arrived for a project that is no longer selected
    StaleResponse { field: VpcField, project: String },
}

impl std::fmt::Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::MissingControl(id) => {
                write!(f, "Required control '{}' is missing from the page", id)
            }
            FormError::FetchFailed {
                field,
                project,
                reason,
            } => write!(
                f,
                "Failed to fetch {} for project '{}': {}",
                field.label(),
                project,
                reason
            ),
            FormError::StaleResponse { field, project } => write!(
                f,
                "Discarded {} response for project '{}' which is no longer selected",
                field.label(),
                project
            ),
        }
    }
}

impl std::error::Error for FormError {}
