//! Small reusable widgets: status badge, banners, and the typing indicator.

use client_core::{BadgeTone, StatusBadge};

use crate::ui::theme;

pub fn status_badge(ui: &mut egui::Ui, badge: &StatusBadge) -> egui::Response {
    let color = match badge.tone {
        BadgeTone::Ready => theme::ONLINE,
        BadgeTone::AwaitingResume => theme::WAITING,
        BadgeTone::Offline => theme::OFFLINE,
    };
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
        ui.painter().circle_filled(rect.center(), 4.5, color);
        ui.label(egui::RichText::new(&badge.text).small().strong());
    })
    .response
}

/// Inline banner; returns true when the dismiss button was clicked.
pub fn banner(ui: &mut egui::Ui, message: &str, is_error: bool, dismissable: bool) -> bool {
    let (fill, stroke) = if is_error {
        (
            egui::Color32::from_rgb(111, 53, 53),
            egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
        )
    } else {
        (
            egui::Color32::from_rgb(44, 74, 104),
            egui::Stroke::new(1.0, egui::Color32::from_rgb(92, 138, 180)),
        )
    };

    let mut dismissed = false;
    egui::Frame::NONE
        .fill(fill)
        .stroke(stroke)
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 8))
        .show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                let icon = if is_error { "⚠" } else { "ℹ" };
                ui.label(egui::RichText::new(format!("{icon} {message}")).color(egui::Color32::WHITE));
                if dismissable {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Dismiss").clicked() {
                            dismissed = true;
                        }
                    });
                }
            });
        });
    dismissed
}

pub fn typing_indicator(ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.spinner();
        ui.weak("Thinking…");
    });
}
