//! AWS Device Farm integration
//!
//! Everything the settings page needs to know about Device Farm: the project
//! listing behind the project selector, VPCE configurations behind the VPC
//! endpoint selector, and the per-project VPC lookups the form controller
//! issues through [`VpcBridge`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dfvpc::app::config::AppConfig;
//! use dfvpc::app::device_farm::{DeviceFarmBridge, DeviceFarmClient, VpcBridge};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = Arc::new(DeviceFarmClient::connect(&AppConfig::default()).await?);
//! let bridge = DeviceFarmBridge::new(client);
//!
//! let vpc_id = bridge.fetch_vpc_id_from_project_name("private-devices").await?;
//! println!("VPC: {}", vpc_id);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all, rust_2018_idioms)]

pub mod bridge;
pub mod catalog;
pub mod client;
pub mod types;

pub use bridge::{BridgeError, DeviceFarmBridge, VpcBridge};
pub use catalog::ProjectCatalog;
pub use client::{DeviceFarmClient, ProjectDirectory};
pub use types::{format_id_list, DeviceFarmProject, ProjectVpcSettings};
