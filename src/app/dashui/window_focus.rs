//! Window Focus Management
//!
//! Common interface for windows that can be brought to the foreground.

use eframe::egui;

/// Trait for windows that can be brought to the foreground
///
/// # Example
/// ```rust,ignore
/// impl FocusableWindow for HelpWindow {
///     type ShowParams = ();
///
///     fn window_id(&self) -> &'static str { "help" }
///     fn window_title(&self) -> String { "Help".to_string() }
///     fn is_open(&self) -> bool { self.open }
///
///     fn show_with_focus(&mut self, ctx: &egui::Context, _params: (), bring_to_front: bool) {
///         let mut window = egui::Window::new("Help");
///         if bring_to_front {
///             window = window.order(egui::Order::Foreground);
///         }
///         window.show(ctx, |ui| { /* ... */ });
///     }
/// }
/// ```
pub trait FocusableWindow {
    /// Parameters required for the show method
    type ShowParams;

    /// Unique identifier for this window type
    fn window_id(&self) -> &'static str;

    /// Human-readable title, matching the title bar
    fn window_title(&self) -> String;

    fn is_open(&self) -> bool;

    /// Render the window, with `egui::Order::Foreground` when `bring_to_front` is set
    fn show_with_focus(
        &mut self,
        ctx: &egui::Context,
        params: Self::ShowParams,
        bring_to_front: bool,
    );
}
