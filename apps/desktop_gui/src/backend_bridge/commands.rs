//! Backend commands queued from UI to backend worker.

use std::{path::PathBuf, sync::Arc};

pub enum BackendCommand {
    RefreshStatus,
    UploadPath {
        path: PathBuf,
    },
    /// Dropped files that arrive without a filesystem path (web or sandboxed drops).
    UploadBytes {
        file_name: String,
        bytes: Arc<[u8]>,
    },
    SendChat {
        text: String,
    },
    GoToChat,
    GoToLanding,
    InitializeBackend {
        force_reload: bool,
    },
    ResetBackend,
    LoadSampleQuestions,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RefreshStatus => "refresh_status",
            Self::UploadPath { .. } => "upload_path",
            Self::UploadBytes { .. } => "upload_bytes",
            Self::SendChat { .. } => "send_chat",
            Self::GoToChat => "go_to_chat",
            Self::GoToLanding => "go_to_landing",
            Self::InitializeBackend { .. } => "initialize_backend",
            Self::ResetBackend => "reset_backend",
            Self::LoadSampleQuestions => "load_sample_questions",
        }
    }
}
