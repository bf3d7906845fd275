//! Session controller: the single owner of client state and the only caller of the API.

use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use shared::protocol::{ChatRequest, SystemStatus, DEFAULT_CONTEXT_CHUNKS};
use tokio::sync::{watch, Semaphore};
use tracing::{debug, info, warn};

use crate::{
    api::{HttpResumeApi, ResumeApi, UploadFile},
    error::ClientError,
    state::{Notice, SessionState},
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const PDF_ONLY_MESSAGE: &str = "Please upload a PDF file";
pub const UPLOAD_REJECTED_MESSAGE: &str = "Upload failed";
pub const UPLOAD_FALLBACK_MESSAGE: &str = "Failed to upload. Make sure the backend is running.";
pub const CHAT_FALLBACK_MESSAGE: &str =
    "Failed to get response. Make sure the backend is running.";
const MAINTENANCE_FALLBACK_MESSAGE: &str = "The backend could not be reached.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub request_timeout: Duration,
    pub context_chunks: u32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            context_chunks: DEFAULT_CONTEXT_CHUNKS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded,
    /// Refused locally; no request was issued.
    Rejected(ClientError),
    Failed(ClientError),
    /// Another upload is still in flight.
    Busy,
    /// The attempt was reset while the request was running.
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    Answered(String),
    Failed(ClientError),
    /// Blank input, or a request is already pending.
    Ignored,
    /// The chat view was left before the reply arrived.
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaintenanceOutcome {
    Done(String),
    Failed(ClientError),
    Busy,
}

pub struct SessionController {
    api: Arc<dyn ResumeApi>,
    settings: ControllerSettings,
    state: Mutex<SessionState>,
    updates: watch::Sender<SessionState>,
    /// One permit each; held for the whole request, including after the view was reset.
    chat_slot: Semaphore,
    upload_slot: Semaphore,
    /// Bumped whenever the chat view is left; pending chat requests are dropped.
    left_chat: watch::Sender<u64>,
}

impl SessionController {
    pub fn new(api: Arc<dyn ResumeApi>, settings: ControllerSettings) -> Self {
        let state = SessionState::default();
        let (updates, _) = watch::channel(state.clone());
        let (left_chat, _) = watch::channel(0);
        Self {
            api,
            settings,
            state: Mutex::new(state),
            updates,
            chat_slot: Semaphore::new(1),
            upload_slot: Semaphore::new(1),
            left_chat,
        }
    }

    pub fn with_http(base_url: &str, settings: ControllerSettings) -> Result<Self, ClientError> {
        let api = HttpResumeApi::new(base_url)?;
        info!(base_url = api.base_url(), "using resume API");
        Ok(Self::new(Arc::new(api), settings))
    }

    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    /// Observe one snapshot per completed mutation.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.updates.subscribe()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs one atomic state transition and publishes the result.
    fn mutate<R>(&self, apply: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = self.lock();
        let result = apply(&mut state);
        self.updates.send_replace(state.clone());
        result
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, ClientError>>,
    ) -> Result<T, ClientError> {
        match tokio::time::timeout(self.settings.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    operation,
                    timeout_secs = self.settings.request_timeout.as_secs_f64(),
                    "backend call timed out"
                );
                Err(ClientError::Timeout(self.settings.request_timeout))
            }
        }
    }

    /// Replaces the system status wholesale; any failure reads as offline.
    pub async fn refresh_status(&self) -> SystemStatus {
        let status = match self.bounded("status", self.api.status()).await {
            Ok(status) => status,
            Err(err) => {
                warn!("status check failed: {err}");
                SystemStatus::offline()
            }
        };
        debug!(
            online = status.status.is_online(),
            has_resume = status.has_usable_resume(),
            content_length = status.content_length,
            "status refreshed"
        );
        self.mutate(|state| state.set_status(status.clone()));
        status
    }

    pub async fn upload_file(&self, file: UploadFile) -> UploadOutcome {
        let file_name = file.file_name().to_string();
        let Ok(_slot) = self.upload_slot.try_acquire() else {
            debug!(file = %file_name, "upload already in flight");
            return UploadOutcome::Busy;
        };
        let admitted = self.mutate(|state| {
            if !file.is_pdf() {
                state.reject_upload(&file_name, PDF_ONLY_MESSAGE);
                return Err(UploadOutcome::Rejected(ClientError::Validation(
                    PDF_ONLY_MESSAGE.to_string(),
                )));
            }
            state.begin_upload(&file_name).ok_or(UploadOutcome::Busy)
        });
        let epoch = match admitted {
            Ok(epoch) => epoch,
            Err(outcome) => {
                debug!(file = %file_name, ?outcome, "upload not started");
                return outcome;
            }
        };

        info!(file = %file_name, path = ?file.path(), "uploading resume");
        let result = match self.bounded("upload", self.api.upload(file)).await {
            Ok(response) if response.is_success() => Ok(()),
            Ok(response) => Err(ClientError::backend(
                None,
                response
                    .message
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| UPLOAD_REJECTED_MESSAGE.to_string()),
            )),
            Err(err) => Err(err),
        };

        let user_result = result
            .as_ref()
            .map(|_| ())
            .map_err(|err| err.user_message(UPLOAD_FALLBACK_MESSAGE));
        let applied = self.mutate(|state| state.finish_upload(epoch, user_result));

        match result {
            Ok(()) => {
                info!(file = %file_name, "resume uploaded");
                self.refresh_status().await;
                if applied {
                    UploadOutcome::Uploaded
                } else {
                    UploadOutcome::Discarded
                }
            }
            Err(err) => {
                warn!(file = %file_name, "upload failed: {err}");
                if applied {
                    UploadOutcome::Failed(err)
                } else {
                    UploadOutcome::Discarded
                }
            }
        }
    }

    pub async fn send_chat_message(&self, text: &str) -> ChatOutcome {
        let message = text.trim();
        if message.is_empty() {
            return ChatOutcome::Ignored;
        }
        let Ok(_slot) = self.chat_slot.try_acquire() else {
            debug!("chat request already in flight; ignoring input");
            return ChatOutcome::Ignored;
        };
        // Subscribed before the turn is recorded so a reset in between is still seen.
        let mut left_chat = self.left_chat.subscribe();
        let Some(epoch) = self.mutate(|state| state.begin_chat(message)) else {
            debug!("chat request already pending; ignoring input");
            return ChatOutcome::Ignored;
        };

        let request = ChatRequest {
            message: message.to_string(),
            context_chunks: self.settings.context_chunks,
        };
        let result = tokio::select! {
            result = self.bounded("chat", self.api.chat(request)) => result,
            _ = left_chat.changed() => {
                debug!("chat view left; dropping in-flight request");
                return ChatOutcome::Discarded;
            }
        };

        let user_result = match &result {
            Ok(response) => {
                if let Some(err) = response.error.as_deref().filter(|err| !err.is_empty()) {
                    warn!("backend attached an error to its answer: {err}");
                }
                Ok(response.answer.clone())
            }
            Err(err) => Err(err.user_message(CHAT_FALLBACK_MESSAGE)),
        };
        if !self.mutate(|state| state.finish_chat(epoch, user_result)) {
            debug!("discarding chat reply for a session that was reset");
            return ChatOutcome::Discarded;
        }

        match result {
            Ok(response) => ChatOutcome::Answered(response.answer),
            Err(err) => {
                warn!("chat request failed: {err}");
                ChatOutcome::Failed(err)
            }
        }
    }

    /// "Continue with existing resume"; only moves when a resume is ready.
    pub fn go_to_chat(&self) -> bool {
        self.mutate(|state| state.go_to_chat())
    }

    pub fn go_to_landing(&self) {
        self.mutate(|state| state.go_to_landing());
        self.cancel_chat();
    }

    fn cancel_chat(&self) {
        self.left_chat.send_modify(|generation| *generation = generation.wrapping_add(1));
    }

    pub async fn initialize_backend(&self, force_reload: bool) -> MaintenanceOutcome {
        if !self.mutate(|state| state.begin_maintenance()) {
            return MaintenanceOutcome::Busy;
        }
        info!(force_reload, "initializing backend");
        match self
            .bounded("initialize", self.api.initialize(force_reload))
            .await
        {
            Ok(ack) => {
                let text = ack
                    .message
                    .unwrap_or_else(|| "Backend initialized".to_string());
                self.mutate(|state| state.finish_maintenance(Notice::info(text.clone())));
                self.refresh_status().await;
                MaintenanceOutcome::Done(text)
            }
            Err(err) => {
                warn!("initialize failed: {err}");
                let text = err.user_message(MAINTENANCE_FALLBACK_MESSAGE);
                self.mutate(|state| state.finish_maintenance(Notice::error(text)));
                MaintenanceOutcome::Failed(err)
            }
        }
    }

    pub async fn reset_backend(&self) -> MaintenanceOutcome {
        if !self.mutate(|state| state.begin_maintenance()) {
            return MaintenanceOutcome::Busy;
        }
        info!("resetting backend");
        match self.bounded("reset", self.api.reset()).await {
            Ok(ack) => {
                let text = ack
                    .message
                    .unwrap_or_else(|| "System reset successfully".to_string());
                self.mutate(|state| {
                    state.go_to_landing();
                    state.finish_maintenance(Notice::info(text.clone()));
                });
                self.cancel_chat();
                self.refresh_status().await;
                MaintenanceOutcome::Done(text)
            }
            Err(err) => {
                warn!("reset failed: {err}");
                let text = err.user_message(MAINTENANCE_FALLBACK_MESSAGE);
                self.mutate(|state| state.finish_maintenance(Notice::error(text)));
                MaintenanceOutcome::Failed(err)
            }
        }
    }

    /// Replaces the quick questions with the backend's list; keeps the current ones on
    /// failure.
    pub async fn load_sample_questions(&self) -> Result<usize, ClientError> {
        match self
            .bounded("sample_questions", self.api.sample_questions())
            .await
        {
            Ok(questions) => {
                let count = questions.len();
                self.mutate(|state| state.set_sample_questions(questions));
                Ok(count)
            }
            Err(err) => {
                warn!("could not load sample questions: {err}");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
