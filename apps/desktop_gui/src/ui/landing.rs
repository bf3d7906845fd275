//! Landing view: resume drop zone, upload progress, and backend maintenance.

use std::path::PathBuf;

use client_core::{NoticeKind, UploadPhase};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::ui::{app::ResumeChatApp, theme, widgets};

const DROP_ZONE_HEIGHT: f32 = 180.0;

/// A file handed to the app by drag and drop or the picker.
#[derive(Debug)]
pub(crate) enum PickedFile {
    Path(PathBuf),
    Bytes { file_name: String, bytes: std::sync::Arc<[u8]> },
}

impl PickedFile {
    pub(crate) fn from_dropped(file: &egui::DroppedFile) -> Option<Self> {
        if let Some(path) = file.path.clone() {
            return Some(Self::Path(path));
        }
        // Web and some Wayland compositors hand over contents instead of a path.
        let bytes = file.bytes.clone()?;
        let file_name = if file.name.trim().is_empty() {
            "resume.pdf".to_string()
        } else {
            file.name.clone()
        };
        Some(Self::Bytes { file_name, bytes })
    }

    pub(crate) fn into_command(self) -> BackendCommand {
        match self {
            Self::Path(path) => BackendCommand::UploadPath { path },
            Self::Bytes { file_name, bytes } => BackendCommand::UploadBytes { file_name, bytes },
        }
    }
}

fn default_upload_dir() -> Option<PathBuf> {
    dirs::document_dir()
        .or_else(dirs::download_dir)
        .or_else(dirs::desktop_dir)
        .or_else(dirs::home_dir)
}

impl ResumeChatApp {
    pub(crate) fn show_landing(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let uploading = self.session.upload().phase == UploadPhase::Uploading;

        if !uploading {
            let dropped = ctx.input(|i| i.raw.dropped_files.clone());
            if let Some(file) = dropped.first().and_then(PickedFile::from_dropped) {
                self.dispatch(file.into_command());
            }
        }
        let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(24.0);
                    ui.heading(egui::RichText::new("Chat with any resume").size(30.0).strong());
                    ui.add_space(4.0);
                    ui.label(
                        egui::RichText::new(
                            "Upload a PDF resume and ask questions about skills, experience, and projects.",
                        )
                        .weak(),
                    );
                    ui.add_space(20.0);
                });

                let width = ui.available_width().min(560.0);
                ui.vertical_centered(|ui| {
                    ui.set_max_width(width);
                    self.show_drop_zone(ui, uploading, hovering);
                    ui.add_space(12.0);
                    self.show_upload_feedback(ui);

                    if self.session.has_resume() {
                        ui.add_space(12.0);
                        if ui
                            .add_enabled(
                                !uploading,
                                egui::Button::new("Continue with existing resume →"),
                            )
                            .clicked()
                        {
                            self.dispatch(BackendCommand::GoToChat);
                        }
                    }

                    ui.add_space(28.0);
                    self.show_maintenance(ui);
                });
            });
    }

    fn show_drop_zone(&mut self, ui: &mut egui::Ui, uploading: bool, hovering: bool) {
        let stroke_color = if hovering {
            theme::ACCENT
        } else {
            ui.visuals().widgets.noninteractive.bg_stroke.color
        };
        let frame = egui::Frame::NONE
            .stroke(egui::Stroke::new(if hovering { 2.0 } else { 1.0 }, stroke_color))
            .corner_radius(12.0)
            .inner_margin(egui::Margin::same(16));

        let response = frame
            .show(ui, |ui| {
                ui.set_min_size(egui::vec2(ui.available_width(), DROP_ZONE_HEIGHT));
                ui.vertical_centered(|ui| {
                    ui.add_space(36.0);
                    if uploading {
                        ui.spinner();
                        ui.add_space(6.0);
                        ui.label(format!("Uploading {}…", self.session.upload().file_name));
                    } else {
                        ui.label(egui::RichText::new("📄").size(36.0));
                        ui.add_space(6.0);
                        ui.label(egui::RichText::new("Drop your resume here").strong());
                        ui.weak("or click to browse (PDF only)");
                    }
                });
            })
            .response
            .interact(egui::Sense::click());

        if !uploading && response.on_hover_cursor(egui::CursorIcon::PointingHand).clicked() {
            self.pick_resume();
        }
    }

    /// Native PDF picker; the chosen file is queued for upload.
    pub(crate) fn pick_resume(&mut self) {
        let mut dialog = rfd::FileDialog::new().add_filter("PDF", &["pdf"]);
        if let Some(dir) = default_upload_dir() {
            dialog = dialog.set_directory(dir);
        }
        if let Some(path) = dialog.pick_file() {
            self.dispatch(PickedFile::Path(path).into_command());
        }
    }

    fn show_upload_feedback(&mut self, ui: &mut egui::Ui) {
        let upload = self.session.upload().clone();
        match upload.phase {
            UploadPhase::Idle | UploadPhase::Uploading => {}
            UploadPhase::Success => {
                ui.colored_label(theme::ONLINE, format!("✔ Uploaded: {}", upload.file_name));
            }
            UploadPhase::Error => {
                let message = upload
                    .error_message
                    .unwrap_or_else(|| "Upload failed".to_string());
                widgets::banner(ui, &message, true, false);
            }
        }
    }

    fn show_maintenance(&mut self, ui: &mut egui::Ui) {
        let pending = self.session.is_maintenance_pending();
        let online = self.session.badge().is_online();
        let enabled = online && !pending;
        egui::CollapsingHeader::new("Backend maintenance")
            .default_open(false)
            .show(ui, |ui| {
                if !online {
                    ui.weak("The backend is offline.");
                }
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(enabled, egui::Button::new("Re-index resume"))
                        .on_hover_text("Rebuild the backend index from the stored resume")
                        .clicked()
                    {
                        self.dispatch(BackendCommand::InitializeBackend { force_reload: true });
                    }
                    if ui
                        .add_enabled(enabled, egui::Button::new("Reset backend"))
                        .on_hover_text("Forget the current resume and clear the index")
                        .clicked()
                    {
                        self.dispatch(BackendCommand::ResetBackend);
                    }
                    if pending {
                        ui.spinner();
                    }
                });
            });

        if let Some(notice) = self.session.notice().cloned() {
            ui.add_space(8.0);
            widgets::banner(ui, &notice.text, notice.kind == NoticeKind::Error, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_path_becomes_path_upload() {
        let mut file = egui::DroppedFile::default();
        file.path = Some(PathBuf::from("/tmp/cv.pdf"));
        let command = PickedFile::from_dropped(&file)
            .expect("picked")
            .into_command();
        assert!(matches!(
            command,
            BackendCommand::UploadPath { path } if path == PathBuf::from("/tmp/cv.pdf")
        ));
    }

    #[test]
    fn dropped_bytes_keep_their_name() {
        let mut file = egui::DroppedFile::default();
        file.name = "cv.pdf".into();
        file.bytes = Some(std::sync::Arc::from(&b"%PDF-1.4"[..]));
        let command = PickedFile::from_dropped(&file)
            .expect("picked")
            .into_command();
        assert!(matches!(
            command,
            BackendCommand::UploadBytes { file_name, .. } if file_name == "cv.pdf"
        ));
    }

    #[test]
    fn dropped_entry_without_content_is_ignored() {
        assert!(PickedFile::from_dropped(&egui::DroppedFile::default()).is_none());
    }
}
