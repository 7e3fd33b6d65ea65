use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of characters shown for a chat preview before it is cut.
pub const PREVIEW_MAX_CHARS: usize = 40;

/// Text shown in the chat list when a chat has no messages yet.
pub const PREVIEW_PLACEHOLDER: &str = "New chat";

/// A persistent conversation thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
        }
    }

    /// Create a chat with a freshly generated identifier
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    User,
    Assistant,
}

/// One turn in a chat. Immutable once persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub origin: Origin,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(text: impl Into<String>, origin: Origin, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            origin,
            timestamp,
        }
    }

    /// User-authored message stamped now
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Origin::User, Utc::now())
    }

    /// Assistant-authored message stamped now
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(text, Origin::Assistant, Utc::now())
    }

    pub fn is_from_user(&self) -> bool {
        self.origin == Origin::User
    }
}

/// Derived summary of a chat for list display. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPreview {
    pub chat_id: String,
    /// Text of the most recent message, if any
    pub text: Option<String>,
    /// Timestamp of the last message, or the chat creation time
    pub last_activity: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// Reserved; always zero for now
    pub unread_count: u32,
}

impl ChatPreview {
    /// Representative text cut to [`PREVIEW_MAX_CHARS`] with a trailing `...`
    pub fn display_text(&self) -> String {
        match self.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => truncate_preview(text, PREVIEW_MAX_CHARS),
            _ => PREVIEW_PLACEHOLDER.to_string(),
        }
    }

    pub fn display_date(&self) -> String {
        self.last_activity.format("%d.%m.%Y %H:%M").to_string()
    }
}

fn truncate_preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
