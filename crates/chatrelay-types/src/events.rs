use serde::{Deserialize, Serialize};

use crate::chat::Message;

/// Change notification pushed by a message store after each committed write.
///
/// Subscribers receive events in commit order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// A chat record was inserted (not emitted for idempotent re-creation)
    ChatCreated {
        chat_id: String,
    },

    /// A message was appended to a chat
    MessageAppended {
        chat_id: String,
        message: Message,
    },

    /// A chat and all of its messages were removed
    ChatDeleted {
        chat_id: String,
    },
}

impl StoreEvent {
    pub fn chat_id(&self) -> &str {
        match self {
            Self::ChatCreated { chat_id }
            | Self::MessageAppended { chat_id, .. }
            | Self::ChatDeleted { chat_id } => chat_id,
        }
    }

    pub fn concerns(&self, chat_id: &str) -> bool {
        self.chat_id() == chat_id
    }
}
