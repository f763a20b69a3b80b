//! Shared fakes for the integration tests.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use dfvpc::app::device_farm::{
    BridgeError, DeviceFarmProject, ProjectDirectory, ProjectVpcSettings, VpcBridge,
};
use dfvpc::app::vpc_form::{FormSurface, PollOutcome, VpcField, VpcFormController};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;

type Gate = oneshot::Receiver<Result<String, BridgeError>>;

/// Bridge whose answers are released one by one by the test
#[derive(Default)]
pub struct GatedBridge {
    gates: Mutex<HashMap<(String, VpcField), Gate>>,
}

impl GatedBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the lookup of `field` for `project`; the returned sender releases it
    pub fn gate(
        &self,
        project: &str,
        field: VpcField,
    ) -> oneshot::Sender<Result<String, BridgeError>> {
        let (sender, receiver) = oneshot::channel();
        self.gates
            .lock()
            .unwrap()
            .insert((project.to_string(), field), receiver);
        sender
    }

    async fn answer(&self, project: &str, field: VpcField) -> Result<String, BridgeError> {
        let gate = self
            .gates
            .lock()
            .unwrap()
            .remove(&(project.to_string(), field));

        match gate {
            Some(gate) => gate
                .await
                .unwrap_or_else(|_| Err(BridgeError::Request("gate dropped".to_string()))),
            None => Err(BridgeError::ProjectNotFound(project.to_string())),
        }
    }
}

#[async_trait]
impl VpcBridge for GatedBridge {
    async fn fetch_vpc_id_from_project_name(
        &self,
        project_name: &str,
    ) -> Result<String, BridgeError> {
        self.answer(project_name, VpcField::VpcId).await
    }

    async fn fetch_subnet_ids_from_project_name(
        &self,
        project_name: &str,
    ) -> Result<String, BridgeError> {
        self.answer(project_name, VpcField::SubnetIds).await
    }

    async fn fetch_security_group_ids_from_project_name(
        &self,
        project_name: &str,
    ) -> Result<String, BridgeError> {
        self.answer(project_name, VpcField::SecurityGroupIds).await
    }
}

/// In-memory project listing that counts how often it is walked
#[derive(Default)]
pub struct StaticDirectory {
    pub projects: Vec<DeviceFarmProject>,
    pub vpce_service_names: Vec<String>,
    pub fail_vpce: bool,
    pub project_listings: AtomicUsize,
}

impl StaticDirectory {
    pub fn sample() -> Self {
        Self {
            projects: vec![
                DeviceFarmProject::new("web", "arn:aws:devicefarm:us-west-2:1:project:web"),
                DeviceFarmProject::new(
                    "private-devices",
                    "arn:aws:devicefarm:us-west-2:1:project:private",
                )
                .with_vpc(ProjectVpcSettings {
                    vpc_id: "vpc-0abc".to_string(),
                    subnet_ids: vec!["subnet-1".to_string(), "subnet-2".to_string()],
                    security_group_ids: vec!["sg-1".to_string()],
                }),
                DeviceFarmProject::new("Android", "arn:aws:devicefarm:us-west-2:1:project:android"),
            ],
            vpce_service_names: vec![
                "com.amazonaws.vpce.us-west-2.vpce-svc-b".to_string(),
                "com.amazonaws.vpce.us-west-2.vpce-svc-a".to_string(),
            ],
            fail_vpce: false,
            project_listings: AtomicUsize::new(0),
        }
    }

    pub fn listings(&self) -> usize {
        self.project_listings.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProjectDirectory for StaticDirectory {
    async fn list_projects(&self) -> Result<Vec<DeviceFarmProject>> {
        self.project_listings.fetch_add(1, Ordering::SeqCst);
        Ok(self.projects.clone())
    }

    async fn list_vpce_service_names(&self) -> Result<Vec<String>> {
        if self.fail_vpce {
            return Err(anyhow!("AccessDeniedException: not authorized"));
        }
        Ok(self.vpce_service_names.clone())
    }
}

/// Poll until `applied + discarded` responses have arrived, merging the outcomes
pub async fn poll_until(
    controller: &mut VpcFormController,
    surface: &mut FormSurface,
    responses: usize,
) -> PollOutcome {
    let mut total = PollOutcome::default();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);

    while total.applied + total.discarded < responses {
        let outcome = controller.poll_responses(surface);
        total.applied += outcome.applied;
        total.discarded += outcome.discarded;
        total.failures.extend(outcome.failures);

        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {} responses, got {:?}",
            responses,
            total
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    total
}
