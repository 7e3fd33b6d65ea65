use serde::{Deserialize, Serialize};

/// Per-chat orchestration phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    AwaitingReply,
}

/// In-memory state of one open chat session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionStatus {
    pub phase: Phase,
    /// Set when the chat was opened with an unanswered user message in storage.
    /// Cleared by the next request attempt for this chat.
    pub stalled: bool,
    pub last_error: Option<String>,
}

impl SessionStatus {
    /// Whether the UI should show the chat as waiting for a reply
    pub fn processing(&self) -> bool {
        self.phase == Phase::AwaitingReply || self.stalled
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        let status = SessionStatus::default();
        assert!(status.is_idle());
        assert!(!status.processing());
        assert_eq!(status.last_error, None);
    }

    #[test]
    fn test_processing_follows_phase_and_stall() {
        let awaiting = SessionStatus {
            phase: Phase::AwaitingReply,
            ..Default::default()
        };
        assert!(awaiting.processing());

        let stalled = SessionStatus {
            stalled: true,
            ..Default::default()
        };
        assert!(stalled.processing());
        assert!(stalled.is_idle());
    }
}
