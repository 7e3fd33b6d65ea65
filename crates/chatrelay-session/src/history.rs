use chatrelay_llm::ChatMessage;
use chatrelay_types::Message;

/// Request history for the gateway: the system instruction followed by
/// the persisted log in order.
pub fn build_history(system_prompt: &str, messages: &[Message]) -> Vec<ChatMessage> {
    std::iter::once(ChatMessage::system(system_prompt))
        .chain(messages.iter().map(|message| {
            if message.is_from_user() {
                ChatMessage::user(message.text.clone())
            } else {
                ChatMessage::assistant(message.text.clone())
            }
        }))
        .collect()
}

/// Whether a chat is waiting for a reply, judged from its persisted log alone.
///
/// True when the latest message is user-authored and no assistant message
/// carries a strictly later timestamp.
pub fn derive_processing(messages: &[Message]) -> bool {
    match messages.last() {
        Some(last) if last.is_from_user() => !messages
            .iter()
            .any(|m| !m.is_from_user() && m.timestamp > last.timestamp),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatrelay_llm::Role;
    use chatrelay_types::Origin;
    use chrono::{Duration, Utc};

    #[test]
    fn test_history_starts_with_system_prompt() {
        let messages = vec![Message::user("Hello"), Message::assistant("Hi there")];
        let history = build_history("Be brief", &messages);

        assert_eq!(history.len(), 3);
        assert_eq!(history[0], ChatMessage::system("Be brief"));
        assert_eq!(history[1].role, Role::User);
        assert_eq!(history[2], ChatMessage::assistant("Hi there"));
    }

    #[test]
    fn test_no_messages_is_not_processing() {
        assert!(!derive_processing(&[]));
    }

    #[test]
    fn test_trailing_user_message_is_processing() {
        let messages = vec![
            Message::user("one"),
            Message::assistant("two"),
            Message::user("three"),
        ];
        assert!(derive_processing(&messages));
    }

    #[test]
    fn test_answered_chat_is_not_processing() {
        let messages = vec![Message::user("one"), Message::assistant("two")];
        assert!(!derive_processing(&messages));
    }

    #[test]
    fn test_earlier_reply_does_not_count() {
        let ts = Utc::now();
        let messages = vec![
            Message::new("reply", Origin::Assistant, ts - Duration::milliseconds(1)),
            Message::new("question", Origin::User, ts),
        ];
        assert!(derive_processing(&messages));
    }
}
