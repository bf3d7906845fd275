//! Runtime bridge between the UI command queue and the session controller.

use std::{sync::Arc, thread, time::Duration};

use client_core::{
    ChatOutcome, MaintenanceOutcome, SessionController, UploadFile, UploadOutcome,
};
use crossbeam_channel::{Receiver, Sender};
use tokio::task::JoinHandle;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{classify_startup_failure, UiError, UiErrorContext, UiEvent};

pub fn launch(
    controller: Arc<SessionController>,
    status_poll_interval: Option<Duration>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let message = format!("failed to build tokio runtime: {err}");
                tracing::error!("{message}");
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    classify_startup_failure(&message),
                )));
                return;
            }
        };

        runtime.block_on(run_worker(controller, status_poll_interval, cmd_rx, ui_tx));
    });
}

async fn run_worker(
    controller: Arc<SessionController>,
    status_poll_interval: Option<Duration>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    let poll_task = spawn_status_poller(controller.clone(), status_poll_interval);
    tokio::spawn({
        let controller = controller.clone();
        async move {
            let _ = controller.load_sample_questions().await;
        }
    });
    let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

    while let Ok(cmd) = cmd_rx.recv() {
        tracing::info!(command = cmd.name(), "backend: handling command");
        match cmd {
            BackendCommand::RefreshStatus => {
                let controller = controller.clone();
                tokio::spawn(async move {
                    controller.refresh_status().await;
                });
            }
            BackendCommand::UploadPath { path } => {
                spawn_upload(&controller, &ui_tx, UploadFile::from_path(path));
            }
            BackendCommand::UploadBytes { file_name, bytes } => {
                spawn_upload(&controller, &ui_tx, UploadFile::from_bytes(file_name, bytes.to_vec()));
            }
            BackendCommand::SendChat { text } => {
                let controller = controller.clone();
                tokio::spawn(async move {
                    match controller.send_chat_message(&text).await {
                        ChatOutcome::Answered(answer) => {
                            tracing::info!(chars = answer.len(), "backend: chat answered")
                        }
                        ChatOutcome::Failed(err) => {
                            tracing::warn!("backend: chat failed: {err}")
                        }
                        ChatOutcome::Ignored => {
                            tracing::debug!("backend: chat input ignored")
                        }
                        ChatOutcome::Discarded => {}
                    }
                });
            }
            BackendCommand::GoToChat => {
                if !controller.go_to_chat() {
                    let _ = ui_tx.try_send(UiEvent::Info(
                        "No indexed resume yet; upload one first".to_string(),
                    ));
                }
            }
            BackendCommand::GoToLanding => controller.go_to_landing(),
            BackendCommand::InitializeBackend { force_reload } => {
                let controller = controller.clone();
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let outcome = controller.initialize_backend(force_reload).await;
                    report_maintenance(&ui_tx, "initialize", outcome);
                });
            }
            BackendCommand::ResetBackend => {
                let controller = controller.clone();
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let outcome = controller.reset_backend().await;
                    report_maintenance(&ui_tx, "reset", outcome);
                });
            }
            BackendCommand::LoadSampleQuestions => {
                let controller = controller.clone();
                tokio::spawn(async move {
                    let _ = controller.load_sample_questions().await;
                });
            }
        }
    }

    tracing::info!("backend: command queue closed; stopping worker");
    if let Some(task) = poll_task {
        task.abort();
    }
}

fn spawn_status_poller(
    controller: Arc<SessionController>,
    interval: Option<Duration>,
) -> Option<JoinHandle<()>> {
    let Some(interval) = interval else {
        tokio::spawn(async move {
            controller.refresh_status().await;
        });
        return None;
    };
    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            controller.refresh_status().await;
        }
    }))
}

fn spawn_upload(controller: &Arc<SessionController>, ui_tx: &Sender<UiEvent>, file: UploadFile) {
    let controller = controller.clone();
    let ui_tx = ui_tx.clone();
    tokio::spawn(async move {
        let file_name = file.file_name().to_string();
        match controller.upload_file(file).await {
            UploadOutcome::Uploaded => {
                tracing::info!(file = %file_name, "backend: upload complete");
                let _ = controller.load_sample_questions().await;
            }
            UploadOutcome::Busy => {
                let _ = ui_tx.try_send(UiEvent::Info(
                    "An upload is already in progress".to_string(),
                ));
            }
            UploadOutcome::Rejected(err) => {
                tracing::info!(file = %file_name, "backend: upload rejected: {err}");
            }
            UploadOutcome::Failed(err) => {
                tracing::warn!(file = %file_name, "backend: upload failed: {err}");
            }
            UploadOutcome::Discarded => {}
        }
    });
}

fn report_maintenance(ui_tx: &Sender<UiEvent>, operation: &str, outcome: MaintenanceOutcome) {
    match outcome {
        MaintenanceOutcome::Done(message) => {
            tracing::info!(operation, "backend: {message}");
        }
        MaintenanceOutcome::Failed(err) => {
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_client_error(
                UiErrorContext::Maintenance,
                &err,
            )));
        }
        MaintenanceOutcome::Busy => {
            let _ = ui_tx.try_send(UiEvent::Info(format!(
                "Another maintenance call is running; {operation} skipped"
            )));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        net::TcpListener,
        time::{Duration, Instant},
    };

    use client_core::{ControllerSettings, SessionState, UploadPhase};
    use crossbeam_channel::bounded;

    use super::*;

    fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);
        format!("http://127.0.0.1:{port}")
    }

    fn wait_until(controller: &SessionController, done: impl Fn(&SessionState) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !done(&controller.snapshot()) {
            assert!(Instant::now() < deadline, "worker never reached the expected state");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn chat_and_upload_failures_stay_in_session_state() {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let controller = Arc::new(
            SessionController::with_http(
                &closed_port_url(),
                ControllerSettings {
                    request_timeout: Duration::from_secs(5),
                    ..ControllerSettings::default()
                },
            )
            .expect("controller"),
        );
        let (cmd_tx, cmd_rx) = bounded(16);
        let (ui_tx, ui_rx) = bounded(64);
        launch(controller.clone(), None, cmd_rx, ui_tx);

        cmd_tx
            .send(BackendCommand::SendChat {
                text: "What are your skills?".to_string(),
            })
            .expect("send chat");
        wait_until(&controller, |state| state.chat_error().is_some());

        cmd_tx
            .send(BackendCommand::UploadBytes {
                file_name: "resume.pdf".to_string(),
                bytes: Arc::from(&b"%PDF-1.4"[..]),
            })
            .expect("send upload");
        wait_until(&controller, |state| state.upload().phase == UploadPhase::Error);

        let snapshot = controller.snapshot();
        assert_eq!(
            snapshot.chat_error(),
            Some(client_core::CHAT_FALLBACK_MESSAGE)
        );
        assert_eq!(
            snapshot.upload().error_message.as_deref(),
            Some(client_core::UPLOAD_FALLBACK_MESSAGE)
        );

        drop(cmd_tx);
        assert!(ui_rx
            .try_iter()
            .all(|event| matches!(event, UiEvent::Info(_))));
    }
}
