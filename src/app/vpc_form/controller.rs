//! VPC settings form controller.
//!
//! Keeps the derived VPC fields of the settings page in step with the
//! selected Device Farm project and derives the VPC endpoint toggle from the
//! displayed VPC id.
//!
//! Lookups run as tasks on the shared tokio runtime and report back over a
//! channel that the UI drains once per frame through
//! [`VpcFormController::poll_responses`]. Every request is stamped with the
//! generation current at issue time; a response whose generation is no longer
//! current belongs to a superseded selection and is dropped, so only the most
//! recent selection's results are ever displayed.

#![warn(clippy::all, rust_2018_idioms)]

use super::controls::{ControlId, FieldStatus, FormSurface};
use super::error::FormError;
use super::options::{FormOptions, SyncMode, TriggerEvent};
use crate::app::device_farm::bridge::{BridgeError, VpcBridge};
use std::sync::mpsc;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Derived field the bridge can populate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VpcField {
    VpcId,
    SubnetIds,
    SecurityGroupIds,
}

impl VpcField {
    /// Text field the value is written to
    pub fn control(&self) -> ControlId {
        match self {
            VpcField::VpcId => ControlId::VpcId,
            VpcField::SubnetIds => ControlId::SubnetId,
            VpcField::SecurityGroupIds => ControlId::SecurityGroupId,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VpcField::VpcId => "VPC id",
            VpcField::SubnetIds => "subnet ids",
            VpcField::SecurityGroupIds => "security group ids",
        }
    }
}

/// The endpoint toggle is disabled whenever a VPC id is displayed.
pub fn endpoint_toggle_disabled(vpc_id: &str) -> bool {
    !vpc_id.is_empty()
}

/// Result of a bridge lookup travelling back to the UI thread
#[derive(Debug)]
struct FieldResponse {
    generation: u64,
    project: String,
    field: VpcField,
    result: Result<String, BridgeError>,
}

/// What a call to [`VpcFormController::poll_responses`] did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollOutcome {
    /// Responses for the live selection that reached their field
    pub applied: usize,
    /// Responses for superseded selections that were dropped
    pub discarded: usize,
    /// Lookups that failed, one entry per affected field
    pub failures: Vec<FormError>,
}

pub struct VpcFormController {
    options: FormOptions,
    bridge: Arc<dyn VpcBridge>,
    runtime: Handle,
    generation: u64,
    current_project: Option<String>,
    in_flight: usize,
    repaint_ctx: Option<egui::Context>,

    // Channel for receiving lookup results from runtime tasks
    response_sender: mpsc::Sender<FieldResponse>,
    response_receiver: mpsc::Receiver<FieldResponse>,
}

impl VpcFormController {
    /// Bind the controller to a page.
    ///
    /// Fails with [`FormError::MissingControl`] when the page lacks a control
    /// the options require. On success the derived fields are locked (when
    /// configured) and the endpoint toggle already reflects whatever VPC id
    /// the page was restored with.
    pub fn initialize(
        surface: &mut FormSurface,
        options: FormOptions,
        bridge: Arc<dyn VpcBridge>,
        runtime: Handle,
    ) -> Result<Self, FormError> {
        surface.toggle(ControlId::VpceToggle)?;
        surface.select(ControlId::ProjectSelect)?;

        let derived = synced_fields(&options);
        for field in &derived {
            surface.text_field(field.control())?;
        }

        if options.lock_derived_fields {
            for field in &derived {
                surface.text_field_mut(field.control())?.disabled = true;
            }
        }

        let disabled = Self::apply_toggle_rule(surface)?;
        log_debug!(
            "VPC form initialized: trigger={:?}, mode={:?}, endpoint toggle disabled={}",
            options.trigger,
            options.mode,
            disabled
        );

        let (response_sender, response_receiver) = mpsc::channel();

        Ok(Self {
            options,
            bridge,
            runtime,
            generation: 0,
            current_project: None,
            in_flight: 0,
            repaint_ctx: None,
            response_sender,
            response_receiver,
        })
    }

    /// Ask egui for a repaint whenever a lookup completes
    pub fn set_repaint_context(&mut self, ctx: egui::Context) {
        self.repaint_ctx = Some(ctx);
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Project the most recent refetch was issued for
    pub fn current_project(&self) -> Option<&str> {
        self.current_project.as_deref()
    }

    pub fn pending_requests(&self) -> usize {
        self.in_flight
    }

    pub fn has_pending(&self) -> bool {
        self.in_flight > 0
    }

    /// Recompute the endpoint toggle from the displayed VPC id. Returns the new disabled state.
    pub fn apply_toggle_rule(surface: &mut FormSurface) -> Result<bool, FormError> {
        let disabled = endpoint_toggle_disabled(&surface.text_field(ControlId::VpcId)?.value);
        surface.toggle_mut(ControlId::VpceToggle)?.disabled = disabled;
        Ok(disabled)
    }

    /// Handle an event raised by the project selector.
    ///
    /// Returns `Ok(false)` when the event is not the one this controller
    /// listens on.
    pub fn handle_event(
        &mut self,
        surface: &mut FormSurface,
        event: TriggerEvent,
    ) -> Result<bool, FormError> {
        if event != self.options.trigger {
            return Ok(false);
        }

        let selected = surface
            .select(ControlId::ProjectSelect)?
            .selected_text()
            .map(str::to_owned);

        match selected {
            Some(project_name) => self.on_project_changed(surface, &project_name)?,
            None => {
                Self::apply_toggle_rule(surface)?;
            }
        }

        Ok(true)
    }

    pub fn on_project_changed(
        &mut self,
        surface: &mut FormSurface,
        project_name: &str,
    ) -> Result<(), FormError> {
        match self.options.mode {
            SyncMode::RecheckOnly => {
                let disabled = Self::apply_toggle_rule(surface)?;
                log_debug!(
                    "Re-checked endpoint toggle for '{}' without refetch: disabled={}",
                    project_name,
                    disabled
                );
            }
            SyncMode::Refetch => {
                self.generation += 1;
                self.current_project = Some(project_name.to_string());

                for field in synced_fields(&self.options) {
                    surface.text_field_mut(field.control())?.status = FieldStatus::Loading;
                    self.issue(field, project_name);
                }

                log_debug!(
                    "Issued VPC lookups for '{}' (generation {})",
                    project_name,
                    self.generation
                );
            }
        }

        Ok(())
    }

    fn issue(&mut self, field: VpcField, project_name: &str) {
        let bridge = Arc::clone(&self.bridge);
        let sender = self.response_sender.clone();
        let repaint_ctx = self.repaint_ctx.clone();
        let generation = self.generation;
        let timeout = self.options.request_timeout;
        let project = project_name.to_string();

        self.in_flight += 1;

        self.runtime.spawn(async move {
            let lookup = async {
                match field {
                    VpcField::VpcId => bridge.fetch_vpc_id_from_project_name(&project).await,
                    VpcField::SubnetIds => {
                        bridge.fetch_subnet_ids_from_project_name(&project).await
                    }
                    VpcField::SecurityGroupIds => {
                        bridge
                            .fetch_security_group_ids_from_project_name(&project)
                            .await
                    }
                }
            };

            let result = match tokio::time::timeout(timeout, lookup).await {
                Ok(result) => result,
                Err(_) => Err(BridgeError::Timeout(timeout)),
            };

            // Receiver gone means the form was torn down
            let _ = sender.send(FieldResponse {
                generation,
                project,
                field,
                result,
            });

            if let Some(ctx) = repaint_ctx {
                ctx.request_repaint();
            }
        });
    }

    /// Apply every lookup result that has arrived since the last poll.
    pub fn poll_responses(&mut self, surface: &mut FormSurface) -> PollOutcome {
        let mut outcome = PollOutcome::default();

        while let Ok(response) = self.response_receiver.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);

            if response.generation != self.generation {
                let stale = FormError::StaleResponse {
                    field: response.field,
                    project: response.project,
                };
                log_debug!("{}", stale);
                outcome.discarded += 1;
                continue;
            }

            match Self::apply_response(surface, response) {
                Ok(None) => outcome.applied += 1,
                Ok(Some(failure)) => {
                    log_warn!("{}", failure);
                    outcome.applied += 1;
                    outcome.failures.push(failure);
                }
                Err(e) => {
                    log_error!("Could not apply VPC lookup result: {}", e);
                    outcome.failures.push(e);
                }
            }
        }

        outcome
    }

    fn apply_response(
        surface: &mut FormSurface,
        response: FieldResponse,
    ) -> Result<Option<FormError>, FormError> {
        let field = surface.text_field_mut(response.field.control())?;

        let failure = match response.result {
            Ok(value) => {
                field.value = value;
                field.status = FieldStatus::Ready;
                None
            }
            Err(error) => {
                let reason = error.to_string();
                field.status = FieldStatus::Unknown(reason.clone());
                Some(FormError::FetchFailed {
                    field: response.field,
                    project: response.project,
                    reason,
                })
            }
        };

        if response.field == VpcField::VpcId {
            Self::apply_toggle_rule(surface)?;
        }

        Ok(failure)
    }
}

/// Fields a refetch populates under the given options
fn synced_fields(options: &FormOptions) -> Vec<VpcField> {
    let mut fields = vec![VpcField::VpcId];
    if options.sync_subnets {
        fields.push(VpcField::SubnetIds);
    }
    if options.sync_security_groups {
        fields.push(VpcField::SecurityGroupIds);
    }
    fields
}
