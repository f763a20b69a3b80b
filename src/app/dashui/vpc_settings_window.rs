//! Device Farm VPC Settings Window
//!
//! Renders the settings page held in a [`FormSurface`] and feeds selector
//! events to the [`VpcFormController`]. Option lists for the selectors are
//! loaded from the [`ProjectCatalog`] in the background.

#![warn(clippy::all, rust_2018_idioms)]

use super::window_focus::FocusableWindow;
use crate::app::device_farm::{DeviceFarmBridge, ProjectCatalog, ProjectDirectory};
use crate::app::vpc_form::{
    ControlId, FieldStatus, FormError, FormOptions, FormSurface, TriggerEvent, VpcFormController,
};
use eframe::egui;
use egui::{Color32, Context, RichText, Ui};
use serde::{Deserialize, Serialize};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

const WINDOW_TITLE: &str = "Device Farm VPC Settings";

/// Backend services the window talks to
#[derive(Clone)]
pub struct FormServices {
    pub catalog: Arc<ProjectCatalog<dyn ProjectDirectory>>,
    pub bridge: Arc<DeviceFarmBridge<dyn ProjectDirectory>>,
    pub runtime: Handle,
}

impl FormServices {
    pub fn new(directory: Arc<dyn ProjectDirectory>, cache_ttl: Duration, runtime: Handle) -> Self {
        Self {
            catalog: Arc::new(ProjectCatalog::new(Arc::clone(&directory))),
            bridge: Arc::new(DeviceFarmBridge::with_ttl(directory, cache_ttl)),
            runtime,
        }
    }
}

/// Form values restored across application restarts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedForm {
    pub selected_project: Option<String>,
    pub vpc_id: String,
    pub subnet_ids: String,
    pub security_group_ids: String,
    pub use_vpce: bool,
    pub vpce_service_name: Option<String>,
}

impl PersistedForm {
    pub fn from_surface(surface: &FormSurface) -> Self {
        let text = |id| {
            surface
                .text_field(id)
                .map(|field| field.value.clone())
                .unwrap_or_default()
        };
        let selected = |id| {
            surface
                .select(id)
                .ok()
                .and_then(|select| select.selected_text().map(str::to_owned))
        };

        Self {
            selected_project: selected(ControlId::ProjectSelect),
            vpc_id: text(ControlId::VpcId),
            subnet_ids: text(ControlId::SubnetId),
            security_group_ids: text(ControlId::SecurityGroupId),
            use_vpce: surface
                .toggle(ControlId::VpceToggle)
                .map(|toggle| toggle.checked)
                .unwrap_or(false),
            vpce_service_name: selected(ControlId::VpceServiceName),
        }
    }

    /// Write the restored values into the page before the controller binds to it
    pub fn apply_to(&self, surface: &mut FormSurface) {
        for (id, value) in [
            (ControlId::VpcId, &self.vpc_id),
            (ControlId::SubnetId, &self.subnet_ids),
            (ControlId::SecurityGroupId, &self.security_group_ids),
        ] {
            if let Ok(field) = surface.text_field_mut(id) {
                field.value = value.clone();
            }
        }

        if let Ok(toggle) = surface.toggle_mut(ControlId::VpceToggle) {
            toggle.checked = self.use_vpce;
        }

        for (id, value) in [
            (ControlId::ProjectSelect, &self.selected_project),
            (ControlId::VpceServiceName, &self.vpce_service_name),
        ] {
            if let (Ok(select), Some(value)) = (surface.select_mut(id), value) {
                select.set_options(vec![value.clone()]);
                select.select_by_text(value);
            }
        }
    }
}

/// Option lists loaded in the background
struct CatalogUpdate {
    projects: Result<Vec<String>, String>,
    vpce_service_names: Vec<String>,
    refreshed: bool,
}

pub struct VpcSettingsWindow {
    pub open: bool,
    surface: FormSurface,
    controller: Option<VpcFormController>,
    services: Option<FormServices>,

    // State
    init_error: Option<String>,
    catalog_loading: bool,
    catalog_error: Option<String>,
    failures: Vec<FormError>,
    refreshed_projects: Option<usize>,
    repaint_hooked: bool,

    // Channel for receiving option lists from the runtime
    catalog_receiver: mpsc::Receiver<CatalogUpdate>,
    catalog_sender: mpsc::Sender<CatalogUpdate>,
}

impl VpcSettingsWindow {
    pub fn new(mut surface: FormSurface, options: FormOptions, services: FormServices) -> Self {
        let bridge = Arc::clone(&services.bridge);
        let (controller, init_error) = match VpcFormController::initialize(
            &mut surface,
            options,
            bridge,
            services.runtime.clone(),
        ) {
            Ok(controller) => (Some(controller), None),
            Err(e) => {
                log_error!("VPC settings form could not be initialized: {}", e);
                (None, Some(e.to_string()))
            }
        };

        let mut window = Self::with_parts(surface, controller, Some(services));
        window.init_error = init_error;
        window
    }

    /// A window that only shows why the form is not available
    pub fn unavailable(surface: FormSurface, reason: String) -> Self {
        let mut window = Self::with_parts(surface, None, None);
        window.init_error = Some(reason);
        window
    }

    fn with_parts(
        surface: FormSurface,
        controller: Option<VpcFormController>,
        services: Option<FormServices>,
    ) -> Self {
        let (catalog_sender, catalog_receiver) = mpsc::channel();

        Self {
            open: true,
            surface,
            controller,
            services,
            init_error: None,
            catalog_loading: false,
            catalog_error: None,
            failures: Vec::new(),
            refreshed_projects: None,
            repaint_hooked: false,
            catalog_receiver,
            catalog_sender,
        }
    }

    pub fn surface(&self) -> &FormSurface {
        &self.surface
    }

    /// Highlight a project as if the user picked it, raising the events a pick produces
    pub fn select_project(&mut self, name: &str) -> bool {
        let changed = match self.surface.select_mut(ControlId::ProjectSelect) {
            Ok(select) => {
                let previous = select.selected_index;
                select.select_by_text(name) && select.selected_index != previous
            }
            Err(_) => false,
        };

        if changed {
            self.dispatch(TriggerEvent::Change);
        }
        self.dispatch(TriggerEvent::Click);
        changed
    }

    pub fn controller(&self) -> Option<&VpcFormController> {
        self.controller.as_ref()
    }

    pub fn init_error(&self) -> Option<&str> {
        self.init_error.as_deref()
    }

    pub fn is_catalog_loading(&self) -> bool {
        self.catalog_loading
    }

    /// Failures since the last call, for the notification bar
    pub fn take_failures(&mut self) -> Vec<FormError> {
        std::mem::take(&mut self.failures)
    }

    /// Number of projects found by a completed Refresh, once per refresh
    pub fn take_refreshed_projects(&mut self) -> Option<usize> {
        self.refreshed_projects.take()
    }

    pub fn persisted_form(&self) -> PersistedForm {
        PersistedForm::from_surface(&self.surface)
    }

    /// Start loading selector options
    pub fn load_catalog(&mut self) {
        self.spawn_catalog_load(false);
    }

    /// Forget cached projects and VPCE configurations, then load them again
    pub fn refresh_catalog(&mut self) {
        self.spawn_catalog_load(true);
    }

    fn spawn_catalog_load(&mut self, clear_caches: bool) {
        let Some(services) = self.services.clone() else {
            return;
        };

        self.catalog_loading = true;
        self.catalog_error = None;
        let sender = self.catalog_sender.clone();
        let runtime = services.runtime.clone();

        runtime.spawn(async move {
            if clear_caches {
                services.catalog.refresh().await;
                services.bridge.invalidate();
            }

            let projects = match services.catalog.project_names().await {
                Ok(names) => {
                    log_info!("Loaded {} Device Farm projects", names.len());
                    Ok(names)
                }
                Err(e) => {
                    log_error!("Failed to load Device Farm projects: {:#}", e);
                    Err(format!("{:#}", e))
                }
            };
            let vpce_service_names = services.catalog.vpce_service_names().await;

            let _ = sender.send(CatalogUpdate {
                projects,
                vpce_service_names,
                refreshed: clear_caches,
            });
        });
    }

    /// Poll for option lists from the runtime
    fn poll_catalog(&mut self) {
        while let Ok(update) = self.catalog_receiver.try_recv() {
            self.catalog_loading = false;

            match update.projects {
                Ok(names) => {
                    if update.refreshed {
                        self.refreshed_projects = Some(names.len());
                    }
                    if let Ok(select) = self.surface.select_mut(ControlId::ProjectSelect) {
                        select.set_options(names);
                    }
                }
                Err(error_msg) => self.catalog_error = Some(error_msg),
            }

            if let Ok(select) = self.surface.select_mut(ControlId::VpceServiceName) {
                select.set_options(update.vpce_service_names);
            }
        }
    }

    /// Apply completed lookups and catalog loads; called every frame before rendering
    pub fn poll(&mut self) {
        self.poll_catalog();

        if let Some(controller) = self.controller.as_mut() {
            let outcome = controller.poll_responses(&mut self.surface);
            self.failures.extend(outcome.failures);
        }
    }

    /// Route a project selector event to the controller
    pub fn dispatch(&mut self, event: TriggerEvent) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };

        if let Err(e) = controller.handle_event(&mut self.surface, event) {
            log_error!("Failed to handle {:?} on project selector: {}", event, e);
            self.failures.push(e);
        }
    }

    pub fn show(&mut self, ctx: &Context) {
        self.show_with_focus(ctx, (), false);
    }

    fn show_window(&mut self, ctx: &Context, bring_to_front: bool) {
        if !self.open {
            return;
        }

        if !self.repaint_hooked {
            if let Some(controller) = self.controller.as_mut() {
                controller.set_repaint_context(ctx.clone());
            }
            self.repaint_hooked = true;
        }

        self.poll();

        // Keep repainting while catalog loads so the spinner animates
        if self.catalog_loading {
            ctx.request_repaint();
        }

        // Store open state locally to avoid borrow checker issues
        let mut is_open = self.open;

        let mut window = egui::Window::new(WINDOW_TITLE)
            .open(&mut is_open)
            .default_size([520.0, 320.0])
            .resizable(true)
            .collapsible(true);

        if bring_to_front {
            window = window.order(egui::Order::Foreground);
        }

        let mut events = Vec::new();
        let mut refresh = false;

        window.show(ctx, |ui| {
            self.ui_content(ui, &mut events, &mut refresh);
        });

        self.open = is_open;

        for event in events {
            self.dispatch(event);
        }
        if refresh {
            self.refresh_catalog();
        }
    }

    fn ui_content(&mut self, ui: &mut Ui, events: &mut Vec<TriggerEvent>, refresh: &mut bool) {
        if let Some(error) = &self.init_error {
            ui.colored_label(Color32::RED, RichText::new(format!("Error: {}", error)).strong());
            ui.label("The VPC settings form is unavailable.");
            return;
        }

        self.render_project_select(ui, events, refresh);
        ui.separator();
        self.render_vpce_options(ui);
        ui.separator();

        egui::Grid::new("vpc_settings_grid")
            .num_columns(3)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                for (id, label) in [
                    (ControlId::VpcId, "VPC ID"),
                    (ControlId::SubnetId, "Subnet IDs"),
                    (ControlId::SecurityGroupId, "Security Group IDs"),
                ] {
                    self.render_text_field(ui, id, label);
                }
            });

        if let Some(controller) = &self.controller {
            if controller.has_pending() {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(format!(
                        "Looking up VPC settings for {}...",
                        controller.current_project().unwrap_or_default()
                    ));
                });
            }
        }
    }

    fn render_project_select(
        &mut self,
        ui: &mut Ui,
        events: &mut Vec<TriggerEvent>,
        refresh: &mut bool,
    ) {
        let Ok(select) = self.surface.select_mut(ControlId::ProjectSelect) else {
            return;
        };

        let options = select.options.clone();
        let previous = select.selected_index;
        let mut selected_index = select.selected_index;
        let selected_text = select
            .selected_text()
            .unwrap_or("Select a project")
            .to_string();

        ui.horizontal(|ui| {
            let combo = ui.add_enabled_ui(!select.disabled, |ui| {
                egui::ComboBox::from_label("Project")
                    .selected_text(selected_text)
                    .width(260.0)
                    .show_ui(ui, |ui| {
                        for (index, name) in options.iter().enumerate() {
                            ui.selectable_value(&mut selected_index, Some(index), name.as_str());
                        }
                    })
            });

            if combo.inner.response.clicked() {
                events.push(TriggerEvent::Click);
            }

            if self.catalog_loading {
                ui.spinner();
            } else if ui.button("Refresh").clicked() {
                *refresh = true;
            }
        });

        if selected_index != previous {
            select.selected_index = selected_index;
            // Change is delivered before the click that produced it
            events.insert(0, TriggerEvent::Change);
        }

        if let Some(error) = &self.catalog_error {
            ui.colored_label(Color32::RED, format!("Failed to load projects: {}", error));
        }
    }

    fn render_vpce_options(&mut self, ui: &mut Ui) {
        let (enabled, checked) = match self.surface.toggle_mut(ControlId::VpceToggle) {
            Ok(toggle) => {
                let enabled = !toggle.disabled;
                ui.add_enabled(
                    enabled,
                    egui::Checkbox::new(&mut toggle.checked, "Use VPC endpoint (private devices only)"),
                )
                .on_disabled_hover_text("The selected project already has VPC settings");
                (enabled, toggle.checked)
            }
            Err(_) => return,
        };

        if !(enabled && checked) {
            return;
        }

        let Ok(select) = self.surface.select_mut(ControlId::VpceServiceName) else {
            return;
        };

        if select.options.is_empty() {
            ui.label(RichText::new("No VPCE configurations available").italics());
            return;
        }

        let options = select.options.clone();
        let mut selected_index = select.selected_index;
        egui::ComboBox::from_label("VPCE service")
            .selected_text(select.selected_text().unwrap_or("Select a service").to_string())
            .width(260.0)
            .show_ui(ui, |ui| {
                for (index, name) in options.iter().enumerate() {
                    ui.selectable_value(&mut selected_index, Some(index), name.as_str());
                }
            });
        select.selected_index = selected_index;
    }

    fn render_text_field(&mut self, ui: &mut Ui, id: ControlId, label: &str) {
        let Ok(field) = self.surface.text_field_mut(id) else {
            return;
        };

        ui.label(label);
        ui.add_enabled(
            !field.disabled,
            egui::TextEdit::singleline(&mut field.value).desired_width(280.0),
        );
        match &field.status {
            FieldStatus::Ready => {
                ui.label("");
            }
            FieldStatus::Loading => {
                ui.spinner();
            }
            FieldStatus::Unknown(reason) => {
                ui.colored_label(Color32::from_rgb(255, 150, 0), "⚠ unknown")
                    .on_hover_text(reason.as_str());
            }
        }
        ui.end_row();
    }
}

impl FocusableWindow for VpcSettingsWindow {
    type ShowParams = ();

    fn window_id(&self) -> &'static str {
        "vpc_settings_window"
    }

    fn window_title(&self) -> String {
        WINDOW_TITLE.to_string()
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn show_with_focus(&mut self, ctx: &egui::Context, _params: (), bring_to_front: bool) {
        self.show_window(ctx, bring_to_front);
    }
}
