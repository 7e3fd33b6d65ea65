pub mod chat;
pub mod config;
pub mod events;
pub mod state;

pub use chat::{Chat, ChatPreview, Message, Origin, PREVIEW_MAX_CHARS, PREVIEW_PLACEHOLDER};
pub use config::{SessionConfig, DEFAULT_SYSTEM_PROMPT};
pub use events::StoreEvent;
pub use state::{Phase, SessionStatus};
