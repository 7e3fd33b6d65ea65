use chatrelay_types::{Message, SessionStatus};

/// Immutable snapshot of one chat for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatViewState {
    pub chat_id: String,
    /// Chronological, oldest first
    pub messages: Vec<Message>,
    pub processing: bool,
    pub error: Option<String>,
    /// True until the first read of the log completes
    pub is_loading: bool,
}

impl ChatViewState {
    pub fn loading(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            messages: Vec::new(),
            processing: false,
            error: None,
            is_loading: true,
        }
    }

    pub fn from_parts(chat_id: impl Into<String>, messages: Vec<Message>, status: &SessionStatus) -> Self {
        Self {
            chat_id: chat_id.into(),
            messages,
            processing: status.processing(),
            error: status.last_error.clone(),
            is_loading: false,
        }
    }

    /// Most recent first
    pub fn display_messages(&self) -> Vec<&Message> {
        self.messages.iter().rev().collect()
    }

    /// The user spoke last and a reply is pending
    pub fn is_waiting_for_response(&self) -> bool {
        self.processing
            && self
                .messages
                .last()
                .map(Message::is_from_user)
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatrelay_types::Phase;

    #[test]
    fn test_display_order_is_reversed() {
        let state = ChatViewState::from_parts(
            "c1",
            vec![Message::user("first"), Message::assistant("second")],
            &SessionStatus::default(),
        );
        let shown: Vec<&str> = state
            .display_messages()
            .into_iter()
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(shown, vec!["second", "first"]);
    }

    #[test]
    fn test_waiting_needs_processing_and_user_last() {
        let awaiting = SessionStatus {
            phase: Phase::AwaitingReply,
            ..Default::default()
        };

        let state = ChatViewState::from_parts("c1", vec![Message::user("Hi")], &awaiting);
        assert!(state.is_waiting_for_response());

        let empty = ChatViewState::from_parts("c1", Vec::new(), &awaiting);
        assert!(!empty.is_waiting_for_response());

        let idle = ChatViewState::from_parts("c1", vec![Message::user("Hi")], &SessionStatus::default());
        assert!(!idle.is_waiting_for_response());
    }
}
