//! Prelude module for convenient imports
//!
//! ```rust
//! use chatrelay::prelude::*;
//! ```

pub use crate::{
    Chat, ChatPreview, Message, Origin, SessionStatus,
    ChatMessage, CompletionGateway, Credentials, GatewayConfig, GatewayError, YandexGptClient,
    MemoryStore, MessageStore, PersistError, Settings, StoreBuilder,
    ChatSession, ChatViewState, IgnoreReason, SessionError, SessionManager, SubmitOutcome,
};
