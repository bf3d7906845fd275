use serde::{Deserialize, Serialize};

use crate::domain::ServiceStatus;

pub const STATUS_PATH: &str = "/api/status";
pub const CHAT_PATH: &str = "/api/chat";
pub const INITIALIZE_PATH: &str = "/api/initialize";
pub const UPLOAD_PATH: &str = "/api/upload";
pub const RESET_PATH: &str = "/api/reset";
pub const SAMPLE_QUESTIONS_PATH: &str = "/api/sample-questions";

/// Multipart field name carrying the resume document.
pub const UPLOAD_FIELD: &str = "file";
pub const DEFAULT_CONTEXT_CHUNKS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub status: ServiceStatus,
    #[serde(default)]
    pub initialized: bool,
    #[serde(default)]
    pub has_resume: bool,
    #[serde(default)]
    pub content_length: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_path: Option<String>,
}

impl SystemStatus {
    pub fn offline() -> Self {
        Self {
            status: ServiceStatus::Offline,
            initialized: false,
            has_resume: false,
            content_length: 0,
            resume_path: None,
        }
    }

    /// A resume has been uploaded and indexed, so chatting can start right away.
    pub fn has_usable_resume(&self) -> bool {
        self.has_resume && self.initialized
    }
}

impl Default for SystemStatus {
    fn default() -> Self {
        Self::offline()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub context_chunks: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub context: Vec<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub content_length: Option<u64>,
}

impl UploadResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Acknowledgement returned by `/api/initialize` and `/api/reset`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub content_length: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleQuestionsResponse {
    List(Vec<String>),
    Wrapped { questions: Vec<String> },
}

impl SampleQuestionsResponse {
    pub fn into_questions(self) -> Vec<String> {
        match self {
            Self::List(questions) | Self::Wrapped { questions } => questions,
        }
    }
}
