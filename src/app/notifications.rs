//! Dismissible notifications shown along the bottom of the settings window.

#![warn(clippy::all, rust_2018_idioms)]

use egui::Color32;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub created_at: Instant,
    pub expires_at: Option<Instant>,
}

impl Notification {
    pub fn new_error(id: String, title: String, message: String) -> Self {
        Self {
            id,
            title,
            message,
            notification_type: NotificationType::Error,
            created_at: Instant::now(),
            expires_at: None, // Errors don't auto-expire
        }
    }

    pub fn new_warning(id: String, title: String, message: String) -> Self {
        Self {
            id,
            title,
            message,
            notification_type: NotificationType::Warning,
            created_at: Instant::now(),
            expires_at: Some(Instant::now() + Duration::from_secs(30)),
        }
    }

    pub fn new_info(id: String, title: String, message: String) -> Self {
        Self {
            id,
            title,
            message,
            notification_type: NotificationType::Info,
            created_at: Instant::now(),
            expires_at: Some(Instant::now() + Duration::from_secs(10)),
        }
    }

    pub fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            Instant::now() > expires_at
        } else {
            false
        }
    }

    pub fn get_color(&self) -> Color32 {
        match self.notification_type {
            NotificationType::Error => Color32::from_rgb(220, 50, 50),
            NotificationType::Warning => Color32::from_rgb(255, 150, 0),
            NotificationType::Info => Color32::from_rgb(70, 130, 200),
        }
    }

    pub fn get_icon(&self) -> &'static str {
        match self.notification_type {
            NotificationType::Error => "✗",
            NotificationType::Warning => "⚠",
            NotificationType::Info => "ℹ",
        }
    }
}

#[derive(Default)]
pub struct NotificationManager {
    notifications: HashMap<String, Notification>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adding a notification with an existing id replaces it
    pub fn add_notification(&mut self, notification: Notification) {
        self.notifications
            .insert(notification.id.clone(), notification);
    }

    pub fn dismiss_notification(&mut self, id: &str) {
        self.notifications.remove(id);
    }

    pub fn clear_expired(&mut self) {
        self.notifications
            .retain(|_, notification| !notification.is_expired());
    }

    pub fn get_active_notifications(&self) -> Vec<&Notification> {
        let mut notifications: Vec<&Notification> = self.notifications.values().collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notifications
    }

    pub fn get_error_count(&self) -> usize {
        self.notifications
            .values()
            .filter(|n| matches!(n.notification_type, NotificationType::Error))
            .count()
    }

    pub fn render(&mut self, ui: &mut egui::Ui) {
        self.clear_expired();

        let mut dismissed = Vec::new();
        for notification in self.get_active_notifications() {
            ui.horizontal(|ui| {
                ui.colored_label(notification.get_color(), notification.get_icon());
                ui.colored_label(notification.get_color(), notification.title.as_str());
                ui.label(notification.message.as_str());
                if ui.small_button("Dismiss").clicked() {
                    dismissed.push(notification.id.clone());
                }
            });
        }

        for id in dismissed {
            self.dismiss_notification(&id);
        }
    }
}
