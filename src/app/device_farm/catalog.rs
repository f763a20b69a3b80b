//! Option lists for the settings page selectors.
//!
//! Project and VPCE service names are fetched once, sorted ignoring case and
//! served from memory until [`ProjectCatalog::refresh`] is called.

#![warn(clippy::all, rust_2018_idioms)]

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::client::ProjectDirectory;

pub struct ProjectCatalog<D: ProjectDirectory + ?Sized> {
    directory: Arc<D>,
    project_names: RwLock<Option<Vec<String>>>,
    vpce_service_names: RwLock<Option<Vec<String>>>,
}

impl<D: ProjectDirectory + ?Sized> ProjectCatalog<D> {
    pub fn new(directory: Arc<D>) -> Self {
        Self {
            directory,
            project_names: RwLock::new(None),
            vpce_service_names: RwLock::new(None),
        }
    }

    /// Names of every project in the account
    pub async fn project_names(&self) -> Result<Vec<String>> {
        if let Some(names) = self.project_names.read().await.as_ref() {
            return Ok(names.clone());
        }

        let mut cached = self.project_names.write().await;
        if let Some(names) = cached.as_ref() {
            return Ok(names.clone());
        }

        let mut names: Vec<String> = self
            .directory
            .list_projects()
            .await?
            .into_iter()
            .map(|project| project.name)
            .collect();
        sort_case_insensitive(&mut names);

        debug!("Cached {} project names", names.len());
        *cached = Some(names.clone());
        Ok(names)
    }

    /// Service names of every VPCE configuration.
    ///
    /// VPC endpoints are a private device feature; accounts without access get
    /// an empty list rather than an error.
    pub async fn vpce_service_names(&self) -> Vec<String> {
        if let Some(names) = self.vpce_service_names.read().await.as_ref() {
            return names.clone();
        }

        let mut cached = self.vpce_service_names.write().await;
        if let Some(names) = cached.as_ref() {
            return names.clone();
        }

        let names = match self.directory.list_vpce_service_names().await {
            Ok(mut names) => {
                sort_case_insensitive(&mut names);
                names
            }
            Err(e) => {
                warn!(
                    "Account has no VPCE configuration or is not allowed to use VPC endpoints: {:#}",
                    e
                );
                Vec::new()
            }
        };

        *cached = Some(names.clone());
        names
    }

    /// Forget cached names so the next read hits the API
    pub async fn refresh(&self) {
        *self.project_names.write().await = None;
        *self.vpce_service_names.write().await = None;
        debug!("Project catalog cleared");
    }
}

fn sort_case_insensitive(names: &mut [String]) {
    names.sort_by_cached_key(|name| name.to_lowercase());
}
