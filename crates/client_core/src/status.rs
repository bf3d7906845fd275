use shared::protocol::SystemStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Ready,
    AwaitingResume,
    Offline,
}

/// Text and tone of the persistent backend status badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub tone: BadgeTone,
    pub text: String,
}

impl StatusBadge {
    pub fn from_status(status: &SystemStatus) -> Self {
        if !status.status.is_online() {
            return Self {
                tone: BadgeTone::Offline,
                text: "Backend Offline".to_string(),
            };
        }
        if status.has_usable_resume() {
            Self {
                tone: BadgeTone::Ready,
                text: format!("Ready ({} chars)", status.content_length),
            }
        } else {
            Self {
                tone: BadgeTone::AwaitingResume,
                text: "Upload a resume to start".to_string(),
            }
        }
    }

    pub fn is_online(&self) -> bool {
        self.tone != BadgeTone::Offline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(json: &str) -> SystemStatus {
        serde_json::from_str(json).expect("status")
    }

    #[test]
    fn ready_badge_reports_content_length() {
        let badge = StatusBadge::from_status(&status(
            r#"{"status":"online","initialized":true,"has_resume":true,"content_length":4200}"#,
        ));
        assert_eq!(badge.tone, BadgeTone::Ready);
        assert_eq!(badge.text, "Ready (4200 chars)");
    }

    #[test]
    fn online_without_indexed_resume_asks_for_upload() {
        let badge = StatusBadge::from_status(&status(
            r#"{"status":"online","initialized":false,"has_resume":true,"content_length":0}"#,
        ));
        assert_eq!(badge.text, "Upload a resume to start");
        assert!(badge.is_online());
    }

    #[test]
    fn offline_and_error_states_show_backend_offline() {
        assert_eq!(
            StatusBadge::from_status(&SystemStatus::offline()).text,
            "Backend Offline"
        );
        let errored = StatusBadge::from_status(&status(
            r#"{"status":"error","initialized":false,"has_resume":false,"content_length":0}"#,
        ));
        assert_eq!(errored.tone, BadgeTone::Offline);
    }
}
