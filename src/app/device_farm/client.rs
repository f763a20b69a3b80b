//! Device Farm client wrapper
//!
//! Lists projects and VPCE configurations through `aws-sdk-devicefarm`,
//! following pagination tokens until the listing is complete.

#![warn(clippy::all, rust_2018_idioms)]

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_devicefarm as devicefarm;

use super::types::{DeviceFarmProject, ProjectVpcSettings};
use crate::app::config::AppConfig;

/// Source of Device Farm projects and VPCE configurations
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    /// Every project in the account
    async fn list_projects(&self) -> Result<Vec<DeviceFarmProject>>;

    /// Service names of every VPCE configuration in the account
    async fn list_vpce_service_names(&self) -> Result<Vec<String>>;
}

#[derive(Clone)]
pub struct DeviceFarmClient {
    client: devicefarm::Client,
}

impl DeviceFarmClient {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: devicefarm::Client::new(sdk_config),
        }
    }

    /// Build a client from the application configuration
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let sdk_config = config
            .credentials
            .load_sdk_config(&config.region)
            .await
            .with_context(|| format!("Failed to create AWS config for region {}", config.region))?;

        Ok(Self::new(&sdk_config))
    }
}

#[async_trait]
impl ProjectDirectory for DeviceFarmClient {
    async fn list_projects(&self) -> Result<Vec<DeviceFarmProject>> {
        let mut projects = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let response = self
                .client
                .list_projects()
                .set_next_token(next_token.take())
                .send()
                .await
                .context("Failed to list Device Farm projects")?;

            for project in response.projects() {
                let Some(name) = project.name() else {
                    continue;
                };

                let vpc = project.vpc_config().map(|config| ProjectVpcSettings {
                    vpc_id: config.vpc_id().to_string(),
                    subnet_ids: config.subnet_ids().to_vec(),
                    security_group_ids: config.security_group_ids().to_vec(),
                });

                projects.push(DeviceFarmProject {
                    name: name.to_string(),
                    arn: project.arn().unwrap_or_default().to_string(),
                    vpc,
                });
            }

            match response.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        log_debug!("Listed {} Device Farm projects", projects.len());
        Ok(projects)
    }

    async fn list_vpce_service_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let response = self
                .client
                .list_vpce_configurations()
                .set_next_token(next_token.take())
                .send()
                .await
                .context("Failed to list Device Farm VPCE configurations")?;

            names.extend(
                response
                    .vpce_configurations()
                    .iter()
                    .filter_map(|config| config.vpce_service_name())
                    .map(str::to_owned),
            );

            match response.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        log_debug!("Listed {} VPCE configurations", names.len());
        Ok(names)
    }
}
