//! Session state owned by [`crate::SessionController`].
//!
//! Readers get cloned snapshots; every mutation goes through the crate-private
//! transition methods below, which the controller calls under its lock.

use shared::{domain::ChatMessage, protocol::SystemStatus};

use crate::status::StatusBadge;

pub const DEFAULT_SAMPLE_QUESTIONS: [&str; 6] = [
    "What are your skills?",
    "Tell me about your experience",
    "What projects have you worked on?",
    "What's your educational background?",
    "What technologies do you know?",
    "What are your certifications?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Landing,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    Uploading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadAttempt {
    pub file_name: String,
    pub phase: UploadPhase,
    pub error_message: Option<String>,
}

impl UploadAttempt {
    pub fn is_in_flight(&self) -> bool {
        self.phase == UploadPhase::Uploading
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    view: ViewState,
    status: SystemStatus,
    transcript: Vec<ChatMessage>,
    chat_pending: bool,
    chat_error: Option<String>,
    chat_epoch: u64,
    upload: UploadAttempt,
    upload_epoch: u64,
    maintenance_pending: bool,
    notice: Option<Notice>,
    sample_questions: Vec<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            view: ViewState::Landing,
            status: SystemStatus::offline(),
            transcript: Vec::new(),
            chat_pending: false,
            chat_error: None,
            chat_epoch: 0,
            upload: UploadAttempt::default(),
            upload_epoch: 0,
            maintenance_pending: false,
            notice: None,
            sample_questions: DEFAULT_SAMPLE_QUESTIONS
                .iter()
                .map(|question| question.to_string())
                .collect(),
        }
    }
}

impl SessionState {
    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn status(&self) -> &SystemStatus {
        &self.status
    }

    /// Gates the "continue with existing resume" action.
    pub fn has_resume(&self) -> bool {
        self.status.has_usable_resume()
    }

    pub fn badge(&self) -> StatusBadge {
        StatusBadge::from_status(&self.status)
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn is_chat_pending(&self) -> bool {
        self.chat_pending
    }

    pub fn chat_error(&self) -> Option<&str> {
        self.chat_error.as_deref()
    }

    pub fn upload(&self) -> &UploadAttempt {
        &self.upload
    }

    pub fn is_maintenance_pending(&self) -> bool {
        self.maintenance_pending
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn sample_questions(&self) -> &[String] {
        &self.sample_questions
    }

    pub(crate) fn set_status(&mut self, status: SystemStatus) {
        self.status = status;
    }

    /// Returns the epoch the completion must present, or `None` when the attempt is
    /// refused because another upload is in flight.
    pub(crate) fn begin_upload(&mut self, file_name: &str) -> Option<u64> {
        if self.upload.is_in_flight() {
            return None;
        }
        self.upload = UploadAttempt {
            file_name: file_name.to_string(),
            phase: UploadPhase::Uploading,
            error_message: None,
        };
        Some(self.upload_epoch)
    }

    pub(crate) fn reject_upload(&mut self, file_name: &str, message: impl Into<String>) {
        self.upload = UploadAttempt {
            file_name: file_name.to_string(),
            phase: UploadPhase::Error,
            error_message: Some(message.into()),
        };
    }

    /// Applies an upload completion. Stale completions (the attempt was reset while the
    /// request was running) are dropped and `false` is returned.
    pub(crate) fn finish_upload(&mut self, epoch: u64, outcome: Result<(), String>) -> bool {
        if epoch != self.upload_epoch || !self.upload.is_in_flight() {
            return false;
        }
        match outcome {
            Ok(()) => {
                self.upload.phase = UploadPhase::Success;
                self.upload.error_message = None;
                self.view = ViewState::Chat;
            }
            Err(message) => {
                self.upload.phase = UploadPhase::Error;
                self.upload.error_message = Some(message);
            }
        }
        true
    }

    /// Appends the user turn and marks the request pending. Returns the chat epoch the
    /// reply belongs to, or `None` if a request is already pending.
    pub(crate) fn begin_chat(&mut self, text: &str) -> Option<u64> {
        if self.chat_pending {
            return None;
        }
        self.chat_error = None;
        self.transcript.push(ChatMessage::user(text));
        self.chat_pending = true;
        Some(self.chat_epoch)
    }

    pub(crate) fn finish_chat(&mut self, epoch: u64, outcome: Result<String, String>) -> bool {
        if epoch != self.chat_epoch || !self.chat_pending {
            return false;
        }
        self.chat_pending = false;
        match outcome {
            Ok(answer) => self.transcript.push(ChatMessage::assistant(answer)),
            Err(message) => self.chat_error = Some(message),
        }
        true
    }

    pub(crate) fn go_to_chat(&mut self) -> bool {
        if !self.has_resume() {
            return false;
        }
        self.view = ViewState::Chat;
        true
    }

    /// Full reset of chat-scoped state. In-flight chat and upload completions from before
    /// the reset are invalidated.
    pub(crate) fn go_to_landing(&mut self) {
        self.view = ViewState::Landing;
        self.transcript.clear();
        self.chat_pending = false;
        self.chat_error = None;
        self.chat_epoch = self.chat_epoch.wrapping_add(1);
        self.upload = UploadAttempt::default();
        self.upload_epoch = self.upload_epoch.wrapping_add(1);
        self.notice = None;
    }

    pub(crate) fn begin_maintenance(&mut self) -> bool {
        if self.maintenance_pending {
            return false;
        }
        self.maintenance_pending = true;
        self.notice = None;
        true
    }

    pub(crate) fn finish_maintenance(&mut self, notice: Notice) {
        self.maintenance_pending = false;
        self.notice = Some(notice);
    }

    pub(crate) fn set_sample_questions(&mut self, questions: Vec<String>) {
        if !questions.is_empty() {
            self.sample_questions = questions;
        }
    }
}
