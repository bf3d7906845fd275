mod backend_bridge;
mod controller;
mod ui;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use client_core::{load_settings, SessionController, SettingsOverrides};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::{
    theme::{DisplaySettings, SETTINGS_STORAGE_KEY},
    ResumeChatApp, StartupConfig,
};

#[derive(Parser, Debug)]
#[command(name = "resume-chat", about = "Chat with an uploaded resume")]
struct Args {
    /// Extra TOML configuration file; must exist when given.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_base_url: Option<String>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[arg(long)]
    context_chunks: Option<u32>,
    /// Background status poll interval; 0 disables polling.
    #[arg(long)]
    poll_secs: Option<u64>,
}

impl Args {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            config_path: self.config.clone(),
            api_base_url: self.api_base_url.clone(),
            request_timeout_secs: self.timeout_secs,
            context_chunks: self.context_chunks,
            status_poll_interval_secs: self.poll_secs,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let settings = load_settings(&args.overrides()).context("loading client settings")?;
    tracing::info!(
        api_base_url = %settings.api_base_url,
        timeout_secs = settings.request_timeout_secs,
        context_chunks = settings.context_chunks,
        "starting resume chat"
    );

    let controller = Arc::new(
        SessionController::with_http(&settings.api_base_url, settings.controller_settings())
            .context("building API client")?,
    );
    let session_rx = controller.subscribe();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(
        controller,
        settings.status_poll_interval(),
        cmd_rx,
        ui_tx,
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("ResumeAI")
            .with_inner_size([1024.0, 760.0])
            .with_min_inner_size([640.0, 520.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    let api_base_url = settings.api_base_url.clone();
    eframe::run_native(
        "ResumeAI",
        options,
        Box::new(move |cc| {
            let display = cc.storage.and_then(|storage| {
                storage
                    .get_string(SETTINGS_STORAGE_KEY)
                    .and_then(|text| DisplaySettings::from_storage(&text))
            });
            Ok(Box::new(ResumeChatApp::new(
                cmd_tx,
                ui_rx,
                session_rx,
                StartupConfig {
                    api_base_url,
                    display,
                },
            )))
        }),
    )
    .map_err(|err| anyhow::anyhow!("desktop UI failed: {err}"))
}
