//! Client core for the resume chat application: the HTTP boundary to the question
//! answering backend and the session controller that owns all client state.

pub mod api;
pub mod controller;
pub mod error;
pub mod settings;
pub mod state;
pub mod status;

pub use api::{HttpResumeApi, ResumeApi, UploadFile};
pub use controller::{
    ChatOutcome, ControllerSettings, MaintenanceOutcome, SessionController, UploadOutcome,
    CHAT_FALLBACK_MESSAGE, DEFAULT_REQUEST_TIMEOUT, PDF_ONLY_MESSAGE, UPLOAD_FALLBACK_MESSAGE,
};
pub use error::ClientError;
pub use settings::{load_settings, ClientSettings, SettingsError, SettingsOverrides};
pub use state::{Notice, NoticeKind, SessionState, UploadAttempt, UploadPhase, ViewState};
pub use status::{BadgeTone, StatusBadge};
