//! Backend bridge used by the VPC settings form.
//!
//! [`VpcBridge`] is the seam between the form controller and whatever knows
//! a project's VPC configuration. [`DeviceFarmBridge`] answers the lookups
//! from a [`ProjectDirectory`], keeping listed projects in a short-lived cache
//! so that the three lookups issued for one selection share a single
//! `ListProjects` walk.

#![warn(clippy::all, rust_2018_idioms)]

use async_trait::async_trait;
use moka::sync::Cache;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use super::client::ProjectDirectory;
use super::types::{DeviceFarmProject, ProjectVpcSettings};

/// Errors returned by bridge lookups
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// No project with that name exists in the account
    ProjectNotFound(String),
    /// The backend call itself failed
    Request(String),
    /// The lookup did not finish in time
    Timeout(Duration),
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeError::ProjectNotFound(name) => write!(f, "Project '{}' not found", name),
            BridgeError::Request(msg) => write!(f, "Request failed: {}", msg),
            BridgeError::Timeout(after) => {
                write!(f, "Request timed out after {}s", after.as_secs_f32())
            }
        }
    }
}

impl std::error::Error for BridgeError {}

/// Asynchronous project-to-VPC lookups.
///
/// A project without VPC configuration answers every lookup with an empty
/// string; id lists are rendered as `[a, b]`.
#[async_trait]
pub trait VpcBridge: Send + Sync {
    async fn fetch_vpc_id_from_project_name(&self, project_name: &str)
        -> Result<String, BridgeError>;

    async fn fetch_subnet_ids_from_project_name(
        &self,
        project_name: &str,
    ) -> Result<String, BridgeError>;

    async fn fetch_security_group_ids_from_project_name(
        &self,
        project_name: &str,
    ) -> Result<String, BridgeError>;
}

pub struct DeviceFarmBridge<D: ProjectDirectory + ?Sized> {
    directory: Arc<D>,
    projects: Cache<String, DeviceFarmProject>,
    // Serializes listings so concurrent misses trigger a single walk
    listing: tokio::sync::Mutex<()>,
}

impl<D: ProjectDirectory + ?Sized> DeviceFarmBridge<D> {
    /// Default lifetime of a cached project
    pub const DEFAULT_TTL_SECS: u64 = 60;

    pub fn new(directory: Arc<D>) -> Self {
        Self::with_ttl(directory, Duration::from_secs(Self::DEFAULT_TTL_SECS))
    }

    pub fn with_ttl(directory: Arc<D>, ttl: Duration) -> Self {
        Self {
            directory,
            projects: Cache::builder().time_to_live(ttl).build(),
            listing: tokio::sync::Mutex::new(()),
        }
    }

    /// Drop every cached project so the next lookup lists them again
    pub fn invalidate(&self) {
        self.projects.invalidate_all();
    }

    async fn project(&self, project_name: &str) -> Result<DeviceFarmProject, BridgeError> {
        if let Some(project) = self.projects.get(project_name) {
            return Ok(project);
        }

        let _guard = self.listing.lock().await;

        // Another lookup may have listed while we waited
        if let Some(project) = self.projects.get(project_name) {
            return Ok(project);
        }

        let projects = self
            .directory
            .list_projects()
            .await
            .map_err(|e| BridgeError::Request(format!("{:#}", e)))?;

        // Names are not unique; the first listed project with a name wins
        let mut found = None;
        let mut seen = HashSet::new();
        for project in projects {
            if !seen.insert(project.name.clone()) {
                continue;
            }
            if project.name == project_name {
                found = Some(project.clone());
            }
            self.projects.insert(project.name.clone(), project);
        }

        found.ok_or_else(|| BridgeError::ProjectNotFound(project_name.to_string()))
    }

    async fn vpc_settings(
        &self,
        project_name: &str,
    ) -> Result<Option<ProjectVpcSettings>, BridgeError> {
        Ok(self.project(project_name).await?.vpc)
    }
}

#[async_trait]
impl<D: ProjectDirectory + ?Sized> VpcBridge for DeviceFarmBridge<D> {
    async fn fetch_vpc_id_from_project_name(
        &self,
        project_name: &str,
    ) -> Result<String, BridgeError> {
        Ok(self
            .vpc_settings(project_name)
            .await?
            .map(|vpc| vpc.vpc_id)
            .unwrap_or_default())
    }

    async fn fetch_subnet_ids_from_project_name(
        &self,
        project_name: &str,
    ) -> Result<String, BridgeError> {
        Ok(self
            .vpc_settings(project_name)
            .await?
            .map(|vpc| vpc.subnet_ids_text())
            .unwrap_or_default())
    }

    async fn fetch_security_group_ids_from_project_name(
        &self,
        project_name: &str,
    ) -> Result<String, BridgeError> {
        Ok(self
            .vpc_settings(project_name)
            .await?
            .map(|vpc| vpc.security_group_ids_text())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingDirectory {
        projects: Vec<DeviceFarmProject>,
        listings: AtomicUsize,
    }

    #[async_trait]
    impl ProjectDirectory for CountingDirectory {
        async fn list_projects(&self) -> anyhow::Result<Vec<DeviceFarmProject>> {
            self.listings.fetch_add(1, Ordering::SeqCst);
            Ok(self.projects.clone())
        }

        async fn list_vpce_service_names(&self) -> anyhow::Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    struct FailingDirectory;

    #[async_trait]
    impl ProjectDirectory for FailingDirectory {
        async fn list_projects(&self) -> anyhow::Result<Vec<DeviceFarmProject>> {
            anyhow::bail!("AccessDeniedException")
        }

        async fn list_vpce_service_names(&self) -> anyhow::Result<Vec<String>> {
            anyhow::bail!("AccessDeniedException")
        }
    }

    fn directory() -> Arc<CountingDirectory> {
        Arc::new(CountingDirectory {
            projects: vec![
                DeviceFarmProject::new("private-devices", "arn:aws:devicefarm:us-west-2:1:project:a")
                    .with_vpc(ProjectVpcSettings {
                        vpc_id: "vpc-0abc".to_string(),
                        subnet_ids: vec!["subnet-1".to_string(), "subnet-2".to_string()],
                        security_group_ids: vec!["sg-1".to_string()],
                    }),
                DeviceFarmProject::new("public-devices", "arn:aws:devicefarm:us-west-2:1:project:b"),
            ],
            listings: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_lookups_for_project_with_vpc() {
        let bridge = DeviceFarmBridge::new(directory());

        assert_eq!(
            bridge
                .fetch_vpc_id_from_project_name("private-devices")
                .await
                .unwrap(),
            "vpc-0abc"
        );
        assert_eq!(
            bridge
                .fetch_subnet_ids_from_project_name("private-devices")
                .await
                .unwrap(),
            "[subnet-1, subnet-2]"
        );
        assert_eq!(
            bridge
                .fetch_security_group_ids_from_project_name("private-devices")
                .await
                .unwrap(),
            "[sg-1]"
        );
    }

    #[tokio::test]
    async fn test_project_without_vpc_yields_empty_strings() {
        let bridge = DeviceFarmBridge::new(directory());

        assert_eq!(
            bridge
                .fetch_vpc_id_from_project_name("public-devices")
                .await
                .unwrap(),
            ""
        );
        assert_eq!(
            bridge
                .fetch_subnet_ids_from_project_name("public-devices")
                .await
                .unwrap(),
            ""
        );
    }

    #[tokio::test]
    async fn test_unknown_project() {
        let bridge = DeviceFarmBridge::new(directory());

        assert_eq!(
            bridge.fetch_vpc_id_from_project_name("missing").await,
            Err(BridgeError::ProjectNotFound("missing".to_string()))
        );
    }

    #[tokio::test]
    async fn test_lookups_share_one_listing_until_invalidated() {
        let directory = directory();
        let bridge = DeviceFarmBridge::new(Arc::clone(&directory));

        bridge
            .fetch_vpc_id_from_project_name("private-devices")
            .await
            .unwrap();
        bridge
            .fetch_subnet_ids_from_project_name("private-devices")
            .await
            .unwrap();
        bridge
            .fetch_vpc_id_from_project_name("public-devices")
            .await
            .unwrap();
        assert_eq!(directory.listings.load(Ordering::SeqCst), 1);

        bridge.invalidate();
        bridge
            .fetch_vpc_id_from_project_name("private-devices")
            .await
            .unwrap();
        assert_eq!(directory.listings.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_duplicate_names_resolve_to_first_listed_project() {
        let directory = Arc::new(CountingDirectory {
            projects: vec![
                DeviceFarmProject::new("dup", "arn:aws:devicefarm:us-west-2:1:project:first")
                    .with_vpc(ProjectVpcSettings {
                        vpc_id: "vpc-first".to_string(),
                        subnet_ids: vec!["subnet-1".to_string()],
                        security_group_ids: vec!["sg-1".to_string()],
                    }),
                DeviceFarmProject::new("dup", "arn:aws:devicefarm:us-west-2:1:project:second"),
            ],
            listings: AtomicUsize::new(0),
        });
        let bridge = DeviceFarmBridge::new(directory);

        assert_eq!(
            bridge.fetch_vpc_id_from_project_name("dup").await.unwrap(),
            "vpc-first"
        );
        // Served from the cache, which must hold the same project
        assert_eq!(
            bridge.fetch_subnet_ids_from_project_name("dup").await.unwrap(),
            "[subnet-1]"
        );
    }

    #[tokio::test]
    async fn test_directory_failure_is_request_error() {
        let bridge = DeviceFarmBridge::new(Arc::new(FailingDirectory));

        match bridge.fetch_vpc_id_from_project_name("anything").await {
            Err(BridgeError::Request(msg)) => assert!(msg.contains("AccessDeniedException")),
            other => panic!("expected request error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            BridgeError::ProjectNotFound("alpha".to_string()).to_string(),
            "Project 'alpha' not found"
        );
        assert_eq!(
            BridgeError::Timeout(Duration::from_secs(5)).to_string(),
            "Request timed out after 5s"
        );
    }
}
