//! # Chatrelay
//!
//! Chat session orchestration for LLM chat clients. Conversations are kept in a
//! local message store and relayed to the YandexGPT completion API.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatrelay::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::in_memory();
//!     settings.set_api_key(&std::env::var("CHATRELAY_API_KEY")?).await?;
//!     settings.set_scope_id(&std::env::var("CHATRELAY_SCOPE_ID")?).await?;
//!
//!     let manager = SessionManager::builder()
//!         .store(Arc::new(MemoryStore::new()))
//!         .gateway(Arc::new(YandexGptClient::new()?))
//!         .settings(settings)
//!         .build()?;
//!
//!     let session = manager.open("c1").await?;
//!     if let SubmitOutcome::Replied(reply) = session.submit("Hello!").await? {
//!         println!("{}", reply.text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`chatrelay-types`**: chats, messages, previews, store events, session status
//! - **`chatrelay-llm`**: completion gateway and the YandexGPT client
//! - **`chatrelay-persist`**: message store backends, change subscriptions, settings
//! - **`chatrelay-session`**: per-chat orchestration, previews and view state
//!
//! ## Features
//!
//! - `sqlite`: SQLite message store backed by `sqlx`

pub mod prelude;

pub use chatrelay_types::{
    Chat, ChatPreview, Message, Origin, Phase, SessionConfig, SessionStatus, StoreEvent,
};

pub use chatrelay_llm::{
    ChatMessage, CompletionGateway, Credentials, GatewayConfig, GatewayError, Role,
    YandexGptClient,
};

pub use chatrelay_persist::{
    watch_chats, watch_messages, FileSettings, MemorySettings, MemoryStore, MessageStore,
    PersistError, Settings, SettingsStore, StoreBuilder,
};

#[cfg(feature = "sqlite")]
pub use chatrelay_persist::SqliteStore;

pub use chatrelay_session::{
    ChatSession, ChatViewState, IgnoreReason, PreviewAggregator, SessionError, SessionManager,
    SessionManagerBuilder, SubmitOutcome, ViewStateProjector,
};
