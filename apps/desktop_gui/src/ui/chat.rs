use chrono::Local;
use eframe::egui;
use shared::domain::{ChatMessage, Role};

use crate::backend_bridge::commands::BackendCommand;
use crate::ui::{app::ResumeChatApp, theme, widgets};

const COMPOSER_HEIGHT: f32 = 56.0;

fn timestamp_label(message: &ChatMessage) -> String {
    message
        .sent_at
        .with_timezone(&Local)
        .format("%H:%M")
        .to_string()
}

impl ResumeChatApp {
    pub(crate) fn show_chat(&mut self, ui: &mut egui::Ui) {
        let pending = self.session.is_chat_pending();

        ui.horizontal(|ui| {
            if ui.button("← Back").clicked() {
                self.dispatch(BackendCommand::GoToLanding);
            }
            ui.heading("Resume chat");
        });
        ui.separator();

        let transcript_height =
            (ui.available_height() - COMPOSER_HEIGHT - self.quick_questions_height(ui)).max(120.0);
        egui::ScrollArea::vertical()
            .id_salt("transcript")
            .auto_shrink([false, false])
            .max_height(transcript_height)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if self.session.transcript().is_empty() {
                    ui.add_space(12.0);
                    ui.vertical_centered(|ui| {
                        ui.label(egui::RichText::new("👋 Ask me anything about this resume").strong());
                        ui.weak("Try one of the quick questions below to get started.");
                    });
                }

                let messages = self.session.transcript().to_vec();
                for message in &messages {
                    self.show_bubble(ui, message);
                    ui.add_space(6.0);
                }

                if pending {
                    widgets::typing_indicator(ui);
                }
                if let Some(error) = self.session.chat_error().map(str::to_owned) {
                    widgets::banner(ui, &error, true, false);
                }

                if self.scroll_to_bottom {
                    ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                    self.scroll_to_bottom = false;
                }
            });

        ui.separator();
        self.show_quick_questions(ui, pending);
        self.show_composer(ui, pending);
    }

    fn quick_questions_height(&self, ui: &egui::Ui) -> f32 {
        if self.session.sample_questions().is_empty() {
            0.0
        } else {
            ui.spacing().interact_size.y * 2.0 + 12.0
        }
    }

    fn show_bubble(&mut self, ui: &mut egui::Ui, message: &ChatMessage) {
        let from_user = message.role == Role::User;
        let layout = if from_user {
            egui::Layout::right_to_left(egui::Align::TOP)
        } else {
            egui::Layout::left_to_right(egui::Align::TOP)
        };
        let max_width = ui.available_width() * 0.75;

        ui.with_layout(layout, |ui| {
            egui::Frame::NONE
                .fill(theme::bubble_fill(ui.visuals(), from_user))
                .corner_radius(10.0)
                .inner_margin(egui::Margin::symmetric(12, 8))
                .show(ui, |ui| {
                    ui.set_max_width(max_width);
                    ui.vertical(|ui| {
                        let text = egui::RichText::new(&message.text);
                        let text = if from_user {
                            text.color(egui::Color32::WHITE)
                        } else {
                            text
                        };
                        ui.add(egui::Label::new(text).wrap());
                        ui.horizontal(|ui| {
                            ui.small(
                                egui::RichText::new(format!(
                                    "{} · {}",
                                    message.role.label(),
                                    timestamp_label(message)
                                ))
                                .weak(),
                            );
                            if !from_user && ui.small_button("Copy").clicked() {
                                ui.ctx().copy_text(message.text.clone());
                                self.status = "Copied answer to clipboard".to_string();
                            }
                        });
                    });
                });
        });
    }

    fn show_quick_questions(&mut self, ui: &mut egui::Ui, pending: bool) {
        let questions = self.session.sample_questions().to_vec();
        if questions.is_empty() {
            return;
        }
        ui.horizontal_wrapped(|ui| {
            ui.weak("Quick questions:");
            if ui
                .small_button("↻")
                .on_hover_text("Reload suggestions from the backend")
                .clicked()
            {
                self.dispatch(BackendCommand::LoadSampleQuestions);
            }
            for question in questions {
                if ui
                    .add_enabled(!pending, egui::Button::new(&question).small())
                    .clicked()
                {
                    self.dispatch(BackendCommand::SendChat { text: question });
                }
            }
        });
        ui.add_space(6.0);
    }

    fn show_composer(&mut self, ui: &mut egui::Ui, pending: bool) {
        ui.horizontal(|ui| {
            let input_width = ui.available_width() - 72.0;
            let input = ui.add_enabled(
                !pending,
                egui::TextEdit::singleline(&mut self.composer)
                    .hint_text("Ask about skills, experience, projects...")
                    .desired_width(input_width),
            );
            let submitted =
                input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let can_send = !pending && !self.composer.trim().is_empty();
            let clicked = ui
                .add_enabled(can_send, egui::Button::new("Send ➤"))
                .clicked();

            if can_send && (submitted || clicked) {
                let text = std::mem::take(&mut self.composer);
                self.dispatch(BackendCommand::SendChat { text });
                input.request_focus();
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn timestamps_render_as_local_hours_and_minutes() {
        let mut message = ChatMessage::user("hello");
        message.sent_at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 0).unwrap();
        let label = timestamp_label(&message);
        assert_eq!(label.len(), 5);
        assert_eq!(&label[2..3], ":");
    }
}
