use super::vpc_settings_window::{FormServices, PersistedForm, VpcSettingsWindow};
use super::window_focus::FocusableWindow;
use crate::app::config::AppConfig;
use crate::app::notifications::{Notification, NotificationManager};
use crate::app::vpc_form::{FormError, FormSurface};
use eframe::egui;

/// Everything the app needs from startup, or the reason it could not be prepared
pub type Startup = Result<(AppConfig, FormServices), String>;

pub struct VpcSettingsApp {
    window: VpcSettingsWindow,
    notifications: NotificationManager,
}

impl VpcSettingsApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, startup: Startup) -> Self {
        let restored: PersistedForm = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        Self::with_restored_form(restored, startup)
    }

    pub fn with_restored_form(restored: PersistedForm, startup: Startup) -> Self {
        let mut surface = FormSurface::standard();
        restored.apply_to(&mut surface);

        let mut window = match startup {
            Ok((config, services)) => VpcSettingsWindow::new(surface, config.form, services),
            Err(reason) => VpcSettingsWindow::unavailable(surface, reason),
        };
        window.load_catalog();

        Self {
            window,
            notifications: NotificationManager::new(),
        }
    }

    pub fn window(&self) -> &VpcSettingsWindow {
        &self.window
    }

    pub fn notifications(&self) -> &NotificationManager {
        &self.notifications
    }

    fn notify_failures(&mut self) {
        for failure in self.window.take_failures() {
            let notification = match &failure {
                FormError::FetchFailed { field, .. } => Notification::new_warning(
                    format!("fetch_failed_{}", field.control().name()),
                    "VPC lookup failed".to_string(),
                    failure.to_string(),
                ),
                FormError::MissingControl(id) => Notification::new_error(
                    format!("missing_control_{}", id.name()),
                    "Settings page is incomplete".to_string(),
                    failure.to_string(),
                ),
                FormError::StaleResponse { .. } => continue,
            };
            self.notifications.add_notification(notification);
        }

        if let Some(count) = self.window.take_refreshed_projects() {
            self.notifications.add_notification(Notification::new_info(
                "catalog_refreshed".to_string(),
                "Projects refreshed".to_string(),
                format!("{} Device Farm projects loaded", count),
            ));
        }
    }
}

impl eframe::App for VpcSettingsApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.window.persisted_form());
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::bottom("notifications").show(ctx, |ui| {
            self.notifications.render(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if !self.window.is_open() && ui.button("Open VPC settings").clicked() {
                self.window.open = true;
            }
        });

        self.window.show_with_focus(ctx, (), false);
        self.notify_failures();
    }
}
