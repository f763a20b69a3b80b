//! Behaviour of the VPC settings form controller against a gated bridge.

mod common;

use common::{poll_until, GatedBridge};
use dfvpc::app::device_farm::BridgeError;
use dfvpc::app::vpc_form::{
    endpoint_toggle_disabled, ControlId, FieldStatus, FormError, FormOptions, FormSurface,
    SyncMode, TriggerEvent, VpcField, VpcFormController,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

fn surface_with_projects(projects: &[&str]) -> FormSurface {
    let mut surface = FormSurface::standard();
    surface
        .select_mut(ControlId::ProjectSelect)
        .unwrap()
        .set_options(projects.iter().map(|name| name.to_string()).collect());
    surface
}

fn select(surface: &mut FormSurface, project: &str) {
    assert!(surface
        .select_mut(ControlId::ProjectSelect)
        .unwrap()
        .select_by_text(project));
}

fn value(surface: &FormSurface, id: ControlId) -> String {
    surface.text_field(id).unwrap().value.clone()
}

fn status(surface: &FormSurface, id: ControlId) -> FieldStatus {
    surface.text_field(id).unwrap().status.clone()
}

fn toggle_disabled(surface: &FormSurface) -> bool {
    surface.toggle(ControlId::VpceToggle).unwrap().disabled
}

#[test]
fn test_toggle_follows_vpc_id_value() {
    let mut surface = FormSurface::standard();

    for (vpc_id, disabled) in [("vpc-123", true), ("", false), ("vpc-0f00", true)] {
        surface.text_field_mut(ControlId::VpcId).unwrap().value = vpc_id.to_string();
        assert_eq!(
            VpcFormController::apply_toggle_rule(&mut surface).unwrap(),
            disabled
        );
        assert_eq!(toggle_disabled(&surface), disabled);
        assert_eq!(endpoint_toggle_disabled(vpc_id), disabled);
    }
}

#[tokio::test]
async fn test_restored_vpc_id_disables_toggle_at_initialization() {
    let mut surface = FormSurface::standard();
    surface.text_field_mut(ControlId::VpcId).unwrap().value = "vpc-restored".to_string();

    let controller = VpcFormController::initialize(
        &mut surface,
        FormOptions::full(),
        Arc::new(GatedBridge::new()),
        Handle::current(),
    )
    .unwrap();

    assert!(toggle_disabled(&surface));
    assert_eq!(controller.generation(), 0);
    assert!(!controller.has_pending());
}

#[tokio::test]
async fn test_empty_vpc_id_enables_toggle_at_initialization() {
    let mut surface = FormSurface::standard();
    surface.toggle_mut(ControlId::VpceToggle).unwrap().disabled = true;

    VpcFormController::initialize(
        &mut surface,
        FormOptions::reduced(),
        Arc::new(GatedBridge::new()),
        Handle::current(),
    )
    .unwrap();

    assert!(!toggle_disabled(&surface));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_project_selection_populates_each_field() {
    let bridge = Arc::new(GatedBridge::new());
    let vpc = bridge.gate("private-devices", VpcField::VpcId);
    let subnets = bridge.gate("private-devices", VpcField::SubnetIds);
    let groups = bridge.gate("private-devices", VpcField::SecurityGroupIds);

    let mut surface = surface_with_projects(&["private-devices", "web"]);
    let mut controller = VpcFormController::initialize(
        &mut surface,
        FormOptions::full(),
        bridge.clone(),
        Handle::current(),
    )
    .unwrap();

    select(&mut surface, "private-devices");
    assert!(controller
        .handle_event(&mut surface, TriggerEvent::Change)
        .unwrap());
    assert_eq!(status(&surface, ControlId::VpcId), FieldStatus::Loading);

    vpc.send(Ok("vpc-0abc".to_string())).unwrap();
    subnets
        .send(Ok("[subnet-1, subnet-2]".to_string()))
        .unwrap();
    groups.send(Ok("[sg-1]".to_string())).unwrap();

    let outcome = poll_until(&mut controller, &mut surface, 3).await;

    assert_eq!(outcome.applied, 3);
    assert_eq!(outcome.discarded, 0);
    assert!(outcome.failures.is_empty());
    assert_eq!(value(&surface, ControlId::VpcId), "vpc-0abc");
    assert_eq!(value(&surface, ControlId::SubnetId), "[subnet-1, subnet-2]");
    assert_eq!(value(&surface, ControlId::SecurityGroupId), "[sg-1]");
    assert_eq!(status(&surface, ControlId::SubnetId), FieldStatus::Ready);
    assert!(toggle_disabled(&surface));
    assert!(!controller.has_pending());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_subnet_response_leaves_vpc_id_and_toggle_alone() {
    let bridge = Arc::new(GatedBridge::new());
    let _vpc = bridge.gate("web", VpcField::VpcId);
    let subnets = bridge.gate("web", VpcField::SubnetIds);
    let _groups = bridge.gate("web", VpcField::SecurityGroupIds);

    let mut surface = surface_with_projects(&["web"]);
    surface.text_field_mut(ControlId::VpcId).unwrap().value = "vpc-previous".to_string();

    let mut controller = VpcFormController::initialize(
        &mut surface,
        FormOptions::full(),
        bridge.clone(),
        Handle::current(),
    )
    .unwrap();
    assert!(toggle_disabled(&surface));

    select(&mut surface, "web");
    controller.on_project_changed(&mut surface, "web").unwrap();

    subnets.send(Ok("[subnet-9]".to_string())).unwrap();
    let outcome = poll_until(&mut controller, &mut surface, 1).await;

    assert_eq!(outcome.applied, 1);
    assert_eq!(value(&surface, ControlId::SubnetId), "[subnet-9]");
    assert_eq!(value(&surface, ControlId::VpcId), "vpc-previous");
    assert!(toggle_disabled(&surface));
    assert_eq!(controller.pending_requests(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_security_group_failure_does_not_block_other_fields() {
    let bridge = Arc::new(GatedBridge::new());
    let vpc = bridge.gate("private-devices", VpcField::VpcId);
    let subnets = bridge.gate("private-devices", VpcField::SubnetIds);
    let groups = bridge.gate("private-devices", VpcField::SecurityGroupIds);

    let mut surface = surface_with_projects(&["private-devices"]);
    surface
        .text_field_mut(ControlId::SecurityGroupId)
        .unwrap()
        .value = "[sg-old]".to_string();

    let mut controller = VpcFormController::initialize(
        &mut surface,
        FormOptions::full(),
        bridge.clone(),
        Handle::current(),
    )
    .unwrap();

    select(&mut surface, "private-devices");
    controller
        .handle_event(&mut surface, TriggerEvent::Change)
        .unwrap();

    groups
        .send(Err(BridgeError::Request("throttled".to_string())))
        .unwrap();
    let outcome = poll_until(&mut controller, &mut surface, 1).await;
    assert_eq!(
        outcome.failures,
        vec![FormError::FetchFailed {
            field: VpcField::SecurityGroupIds,
            project: "private-devices".to_string(),
            reason: "Request failed: throttled".to_string(),
        }]
    );

    vpc.send(Ok("vpc-0abc".to_string())).unwrap();
    subnets.send(Ok("[subnet-1]".to_string())).unwrap();
    let outcome = poll_until(&mut controller, &mut surface, 2).await;

    assert!(outcome.failures.is_empty());
    assert_eq!(value(&surface, ControlId::VpcId), "vpc-0abc");
    assert_eq!(value(&surface, ControlId::SubnetId), "[subnet-1]");
    assert_eq!(value(&surface, ControlId::SecurityGroupId), "[sg-old]");
    assert_eq!(
        status(&surface, ControlId::SecurityGroupId),
        FieldStatus::Unknown("Request failed: throttled".to_string())
    );
    assert!(toggle_disabled(&surface));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_late_response_for_previous_project_is_discarded() {
    let bridge = Arc::new(GatedBridge::new());
    let a_vpc = bridge.gate("A", VpcField::VpcId);
    let a_subnets = bridge.gate("A", VpcField::SubnetIds);
    let a_groups = bridge.gate("A", VpcField::SecurityGroupIds);
    let b_vpc = bridge.gate("B", VpcField::VpcId);
    let b_subnets = bridge.gate("B", VpcField::SubnetIds);
    let b_groups = bridge.gate("B", VpcField::SecurityGroupIds);

    let mut surface = surface_with_projects(&["A", "B"]);
    let mut controller = VpcFormController::initialize(
        &mut surface,
        FormOptions::full(),
        bridge.clone(),
        Handle::current(),
    )
    .unwrap();

    select(&mut surface, "A");
    controller
        .handle_event(&mut surface, TriggerEvent::Change)
        .unwrap();
    select(&mut surface, "B");
    controller
        .handle_event(&mut surface, TriggerEvent::Change)
        .unwrap();
    assert_eq!(controller.generation(), 2);
    assert_eq!(controller.current_project(), Some("B"));
    assert_eq!(controller.pending_requests(), 6);

    // B has no VPC, so its answers are empty
    b_vpc.send(Ok(String::new())).unwrap();
    b_subnets.send(Ok(String::new())).unwrap();
    b_groups.send(Ok(String::new())).unwrap();
    let outcome = poll_until(&mut controller, &mut surface, 3).await;
    assert_eq!(outcome.applied, 3);
    assert!(!toggle_disabled(&surface));

    a_vpc.send(Ok("vpc-A".to_string())).unwrap();
    a_subnets.send(Ok("[subnet-A]".to_string())).unwrap();
    a_groups.send(Ok("[sg-A]".to_string())).unwrap();
    let outcome = poll_until(&mut controller, &mut surface, 3).await;

    assert_eq!(outcome.applied, 0);
    assert_eq!(outcome.discarded, 3);
    assert_eq!(value(&surface, ControlId::VpcId), "");
    assert_eq!(value(&surface, ControlId::SubnetId), "");
    assert_eq!(value(&surface, ControlId::SecurityGroupId), "");
    assert!(!toggle_disabled(&surface));
    assert!(!controller.has_pending());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_lookup_times_out_into_unknown() {
    let bridge = Arc::new(GatedBridge::new());
    let _vpc = bridge.gate("slow", VpcField::VpcId);

    let mut surface = surface_with_projects(&["slow"]);
    surface.text_field_mut(ControlId::VpcId).unwrap().value = "vpc-kept".to_string();

    let options = FormOptions {
        mode: SyncMode::Refetch,
        trigger: TriggerEvent::Change,
        request_timeout: Duration::from_millis(50),
        ..FormOptions::reduced()
    };

    let mut controller = VpcFormController::initialize(
        &mut surface,
        options,
        bridge.clone(),
        Handle::current(),
    )
    .unwrap();

    select(&mut surface, "slow");
    controller
        .handle_event(&mut surface, TriggerEvent::Change)
        .unwrap();
    assert_eq!(controller.pending_requests(), 1);

    let outcome = poll_until(&mut controller, &mut surface, 1).await;

    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(value(&surface, ControlId::VpcId), "vpc-kept");
    assert!(matches!(
        status(&surface, ControlId::VpcId),
        FieldStatus::Unknown(reason) if reason.contains("timed out")
    ));
    assert!(toggle_disabled(&surface));
}

#[tokio::test]
async fn test_reduced_variant_click_rechecks_unrefetched_value() {
    let mut surface = surface_with_projects(&["A", "B"]);
    select(&mut surface, "A");
    surface.text_field_mut(ControlId::VpcId).unwrap().value = "vpc-A".to_string();

    let mut controller = VpcFormController::initialize(
        &mut surface,
        FormOptions::reduced(),
        Arc::new(GatedBridge::new()),
        Handle::current(),
    )
    .unwrap();
    assert!(toggle_disabled(&surface));

    // Change is not this variant's trigger
    select(&mut surface, "B");
    assert!(!controller
        .handle_event(&mut surface, TriggerEvent::Change)
        .unwrap());

    assert!(controller
        .handle_event(&mut surface, TriggerEvent::Click)
        .unwrap());
    assert!(controller
        .handle_event(&mut surface, TriggerEvent::Click)
        .unwrap());

    assert_eq!(controller.generation(), 0);
    assert!(!controller.has_pending());
    assert_eq!(value(&surface, ControlId::VpcId), "vpc-A");
    assert!(toggle_disabled(&surface));
}

#[tokio::test]
async fn test_missing_vpc_id_field_is_reported() {
    let mut surface = FormSurface::standard();
    surface.remove(ControlId::VpcId);

    let result = VpcFormController::initialize(
        &mut surface,
        FormOptions::full(),
        Arc::new(GatedBridge::new()),
        Handle::current(),
    );

    let error = result.err().unwrap();
    assert_eq!(error, FormError::MissingControl(ControlId::VpcId));
    assert_eq!(error.to_string(), "Required control 'vpcId' is missing from the page");
}
