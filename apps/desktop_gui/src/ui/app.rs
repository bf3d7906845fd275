use std::time::Duration;

use client_core::{SessionState, UploadPhase, ViewState};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use tokio::sync::watch;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorCategory, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::{
    theme::{DisplaySettings, SETTINGS_STORAGE_KEY},
    widgets,
};

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub api_base_url: String,
    pub display: Option<DisplaySettings>,
}

/// What the header's call-to-action button does in each view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderAction {
    BackToLanding,
    PickResume,
}

impl HeaderAction {
    fn for_view(view: ViewState) -> Self {
        match view {
            ViewState::Chat => Self::BackToLanding,
            ViewState::Landing => Self::PickResume,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::BackToLanding => "← Back",
            Self::PickResume => "Get Started",
        }
    }
}

fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Backend => "Backend",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

pub struct ResumeChatApp {
    pub(crate) cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    session_rx: watch::Receiver<SessionState>,
    pub(crate) session: SessionState,
    pub(crate) composer: String,
    pub(crate) status: String,
    pub(crate) error_banner: Option<UiError>,
    api_base_url: String,
    display: DisplaySettings,
    applied_display: Option<DisplaySettings>,
    pub(crate) scroll_to_bottom: bool,
}

impl ResumeChatApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        mut session_rx: watch::Receiver<SessionState>,
        startup: StartupConfig,
    ) -> Self {
        let session = session_rx.borrow_and_update().clone();
        Self {
            cmd_tx,
            ui_rx,
            session_rx,
            session,
            composer: String::new(),
            status: "Connecting to backend...".to_string(),
            error_banner: None,
            api_base_url: startup.api_base_url,
            display: startup.display.unwrap_or_default(),
            applied_display: None,
            scroll_to_bottom: false,
        }
    }

    pub(crate) fn dispatch(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Error(err) => {
                    tracing::warn!(
                        context = ?err.context(),
                        category = err_label(err.category()),
                        "{}",
                        err.message()
                    );
                    self.status = format!("{} error", err_label(err.category()));
                    self.error_banner = Some(err);
                }
            }
        }
    }

    fn sync_session(&mut self) {
        if !self.session_rx.has_changed().unwrap_or(false) {
            return;
        }
        let next = self.session_rx.borrow_and_update().clone();
        if next.transcript().len() != self.session.transcript().len()
            || next.is_chat_pending() != self.session.is_chat_pending()
        {
            self.scroll_to_bottom = true;
        }
        if next.view() != self.session.view() {
            self.composer.clear();
        }
        self.session = next;
    }

    fn apply_display_if_needed(&mut self, ctx: &egui::Context) {
        if self.applied_display != Some(self.display) {
            self.display.apply(ctx);
            self.applied_display = Some(self.display);
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header")
            .exact_height(48.0)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    let logo = ui.add(
                        egui::Label::new(egui::RichText::new("🤖 ResumeAI").heading().strong())
                            .sense(egui::Sense::click()),
                    );
                    let action = HeaderAction::for_view(self.session.view());
                    if logo.clicked() && action == HeaderAction::BackToLanding {
                        self.dispatch(BackendCommand::GoToLanding);
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let enabled = match action {
                            HeaderAction::BackToLanding => true,
                            HeaderAction::PickResume => !self.session.upload().is_in_flight(),
                        };
                        if ui
                            .add_enabled(enabled, egui::Button::new(action.label()))
                            .clicked()
                        {
                            match action {
                                HeaderAction::BackToLanding => {
                                    self.dispatch(BackendCommand::GoToLanding)
                                }
                                HeaderAction::PickResume => self.pick_resume(),
                            }
                        }

                        ui.menu_button("View", |ui| {
                            ui.checkbox(&mut self.display.dark_mode, "Dark mode");
                            ui.add(
                                egui::Slider::new(
                                    &mut self.display.text_scale,
                                    DisplaySettings::text_scale_range(),
                                )
                                .text("Text size"),
                            );
                        });

                        if ui.button("⟳ Status").clicked() {
                            self.dispatch(BackendCommand::RefreshStatus);
                        }
                    });
                });
            });
    }

    fn show_footer(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let status = self.session.status();
                let badge = widgets::status_badge(ui, &self.session.badge());
                if let Some(path) = status.resume_path.as_deref() {
                    badge.on_hover_text(format!("Resume: {path}"));
                }
                ui.separator();
                ui.small(egui::RichText::new(&self.status).weak());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.small(egui::RichText::new(&self.api_base_url).weak());
                });
            });
        });
    }

    fn show_error_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(err) = self.error_banner.clone() {
            let message = format!("{}: {}", err_label(err.category()), err.message());
            if widgets::banner(ui, &message, true, true) {
                self.error_banner = None;
            }
            ui.add_space(8.0);
        }
    }

    fn repaint_interval(&self) -> Duration {
        if self.session.is_chat_pending()
            || self.session.upload().phase == UploadPhase::Uploading
            || self.session.is_maintenance_pending()
        {
            Duration::from_millis(33)
        } else {
            Duration::from_millis(100)
        }
    }
}

impl eframe::App for ResumeChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.sync_session();
        self.apply_display_if_needed(ctx);

        self.show_header(ctx);
        self.show_footer(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_error_banner(ui);
            match self.session.view() {
                ViewState::Landing => self.show_landing(ctx, ui),
                ViewState::Chat => self.show_chat(ui),
            }
        });

        ctx.request_repaint_after(self.repaint_interval());
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Some(serialized) = self.display.to_storage() {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_button_only_navigates_back_from_chat() {
        assert_eq!(
            HeaderAction::for_view(ViewState::Chat),
            HeaderAction::BackToLanding
        );
        assert_eq!(
            HeaderAction::for_view(ViewState::Landing),
            HeaderAction::PickResume
        );
        assert_eq!(HeaderAction::PickResume.label(), "Get Started");
    }
}
