//! UI/backend events and error modeling for the desktop GUI controller.

use client_core::ClientError;

/// Out-of-band notifications from the backend worker. Session state itself is read from
/// the controller's watch channel, not from this queue.
pub enum UiEvent {
    Info(String),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    Transport,
    Backend,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Maintenance,
}

pub fn classify_startup_failure(message: &str) -> String {
    let lower = message.to_ascii_lowercase();
    if lower.contains("runtime") {
        "Backend worker startup failure; verify the local app environment and relaunch.".to_string()
    } else if lower.contains("api_base_url") || lower.contains("configuration") {
        format!("Configuration error: {message}")
    } else {
        format!("Startup error: {message}")
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_client_error(context: UiErrorContext, err: &ClientError) -> Self {
        let category = match err {
            ClientError::Validation(_) => UiErrorCategory::Validation,
            ClientError::Transport(_) | ClientError::Timeout(_) => UiErrorCategory::Transport,
            ClientError::Backend { .. } => UiErrorCategory::Backend,
        };
        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("invalid") || message_lower.contains("missing") {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("unreachable")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn client_errors_map_to_categories() {
        let timeout = UiError::from_client_error(
            UiErrorContext::Maintenance,
            &ClientError::Timeout(Duration::from_secs(30)),
        );
        assert_eq!(timeout.category(), UiErrorCategory::Transport);
        assert_eq!(timeout.context(), UiErrorContext::Maintenance);

        let backend = UiError::from_client_error(
            UiErrorContext::Maintenance,
            &ClientError::backend(Some(500), "Processing failed"),
        );
        assert_eq!(backend.category(), UiErrorCategory::Backend);
        assert_eq!(backend.message(), "Processing failed");
    }

    #[test]
    fn startup_failures_are_classified() {
        assert!(classify_startup_failure("failed to build tokio runtime")
            .starts_with("Backend worker startup failure"));
        assert!(classify_startup_failure("invalid api_base_url 'x'")
            .starts_with("Configuration error"));
    }
}
