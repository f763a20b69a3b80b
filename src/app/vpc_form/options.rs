//! Configuration of the form controller.
//!
//! The settings page historically came in two flavours: a full one that
//! refetches every VPC field whenever the project selection changes, and a
//! reduced one bound to clicks that only re-checks the endpoint toggle. Both
//! are the same controller with different [`FormOptions`].

#![warn(clippy::all, rust_2018_idioms)]

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bound on a single bridge lookup
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Selector event the controller listens on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerEvent {
    /// The highlighted option changed
    Change,
    /// The selector was clicked, whether or not the value changed
    Click,
}

/// What the controller does when its trigger fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Look the VPC fields up again for the selected project
    Refetch,
    /// Re-evaluate the endpoint toggle against the value already displayed
    RecheckOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormOptions {
    pub trigger: TriggerEvent,
    pub mode: SyncMode,
    pub sync_subnets: bool,
    pub sync_security_groups: bool,
    /// Force the derived fields read-only at initialization
    pub lock_derived_fields: bool,
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
}

impl FormOptions {
    pub fn full() -> Self {
        Self {
            trigger: TriggerEvent::Change,
            mode: SyncMode::Refetch,
            sync_subnets: true,
            sync_security_groups: true,
            lock_derived_fields: true,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn reduced() -> Self {
        Self {
            trigger: TriggerEvent::Click,
            mode: SyncMode::RecheckOnly,
            sync_subnets: false,
            sync_security_groups: false,
            lock_derived_fields: false,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Default for FormOptions {
    fn default() -> Self {
        Self::full()
    }
}

/// Timeouts are written as whole seconds
mod duration_secs {
    use serde::{ser::Error, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        if value.subsec_nanos() != 0 {
            return Err(S::Error::custom(format!(
                "timeout of {:?} is not a whole number of seconds",
                value
            )));
        }
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
