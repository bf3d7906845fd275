use serde::{Deserialize, Serialize};

pub const SETTINGS_STORAGE_KEY: &str = "resume_chat_desktop_settings";

const MIN_TEXT_SCALE: f32 = 0.8;
const MAX_TEXT_SCALE: f32 = 1.4;

pub const ACCENT: egui::Color32 = egui::Color32::from_rgb(124, 92, 255);
pub const ONLINE: egui::Color32 = egui::Color32::from_rgb(67, 181, 129);
pub const WAITING: egui::Color32 = egui::Color32::from_rgb(250, 166, 26);
pub const OFFLINE: egui::Color32 = egui::Color32::from_rgb(240, 71, 71);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub dark_mode: bool,
    pub text_scale: f32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            dark_mode: true,
            text_scale: 1.0,
        }
    }
}

impl DisplaySettings {
    pub fn from_storage(raw: &str) -> Option<Self> {
        serde_json::from_str::<Self>(raw).ok().map(Self::sanitized)
    }

    pub fn to_storage(self) -> Option<String> {
        serde_json::to_string(&self.sanitized()).ok()
    }

    pub fn sanitized(self) -> Self {
        Self {
            text_scale: self.text_scale.clamp(MIN_TEXT_SCALE, MAX_TEXT_SCALE),
            ..self
        }
    }

    pub fn text_scale_range() -> std::ops::RangeInclusive<f32> {
        MIN_TEXT_SCALE..=MAX_TEXT_SCALE
    }

    pub fn apply(self, ctx: &egui::Context) {
        let mut visuals = if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        visuals.selection.bg_fill = ACCENT;
        visuals.hyperlink_color = ACCENT;
        ctx.set_visuals(visuals);
        ctx.set_zoom_factor(self.text_scale);
    }
}

pub fn bubble_fill(visuals: &egui::Visuals, from_user: bool) -> egui::Color32 {
    if from_user {
        ACCENT.gamma_multiply(0.85)
    } else {
        visuals.faint_bg_color
    }
}
