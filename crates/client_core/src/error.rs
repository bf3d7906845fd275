use std::time::Duration;

use thiserror::Error;

/// Failures surfaced by the API boundary.
///
/// The session controller turns every variant into user-visible state; none of them
/// escape to the presentation layer as faults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Rejected locally before any request was issued.
    #[error("{0}")]
    Validation(String),
    /// The backend could not be reached or answered without a usable error body.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The backend answered with its own explanation of the failure.
    #[error("{message}")]
    Backend { status: Option<u16>, message: String },
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl ClientError {
    pub fn backend(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// Text to show the user; transport failures collapse into `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(message) | Self::Backend { message, .. } => message.clone(),
            Self::Transport(_) => fallback.to_string(),
            Self::Timeout(after) => format!(
                "The backend did not answer within {}s. Please try again.",
                after.as_secs()
            ),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Transport(format!("invalid response body: {err}"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}
