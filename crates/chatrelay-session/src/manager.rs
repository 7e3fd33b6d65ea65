use std::collections::HashMap;
use std::sync::Arc;

use chatrelay_llm::CompletionGateway;
use chatrelay_persist::{MessageStore, Settings};
use chatrelay_types::{Chat, ChatPreview, SessionConfig};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::preview::PreviewAggregator;
use crate::session::{ChatSession, SessionDeps};
use crate::view::ViewStateProjector;

/// Entry point for the front-end: owns one [`ChatSession`] per open chat and
/// performs every store write.
///
/// Sessions of different chats share no mutable state and run concurrently.
pub struct SessionManager {
    deps: SessionDeps,
    sessions: Mutex<HashMap<String, Arc<ChatSession>>>,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn MessageStore>,
        gateway: Arc<dyn CompletionGateway>,
        settings: Settings,
        config: SessionConfig,
    ) -> Self {
        Self {
            deps: SessionDeps {
                store,
                gateway,
                settings,
                config: Arc::new(config),
            },
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn builder() -> crate::builder::SessionManagerBuilder {
        crate::builder::SessionManagerBuilder::new()
    }

    pub fn store(&self) -> &Arc<dyn MessageStore> {
        &self.deps.store
    }

    pub fn settings(&self) -> &Settings {
        &self.deps.settings
    }

    /// Create a chat with the given id, or a fresh UUID when none is given
    pub async fn create_chat(&self, chat_id: Option<&str>) -> Result<Chat> {
        let chat_id = chat_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Chat::generate().id);

        let chat = self.deps.store.create_chat(&chat_id).await?;
        tracing::info!(chat_id = %chat.id, "Chat ready");
        Ok(chat)
    }

    /// Session for `chat_id`, opened (and the chat created) on first use.
    ///
    /// The session map stays locked while the chat is created so an open can
    /// never interleave with [`delete_chat`](Self::delete_chat). Opens of
    /// different chats therefore run one after another; requests do not.
    pub async fn open(&self, chat_id: &str) -> Result<Arc<ChatSession>> {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get(chat_id) {
            return Ok(session.clone());
        }

        let session = Arc::new(ChatSession::open(chat_id, self.deps.clone()).await?);
        sessions.insert(chat_id.to_string(), session.clone());
        Ok(session)
    }

    /// Remove a chat with all of its messages and retire its session.
    ///
    /// A request still in flight for the chat completes without writing and
    /// reports `NotFound`. Returns whether the chat existed.
    pub async fn delete_chat(&self, chat_id: &str) -> Result<bool> {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.remove(chat_id) {
            session.retire().await;
        }
        let removed = self.deps.store.delete_chat(chat_id).await?;
        drop(sessions);

        tracing::info!(chat_id = %chat_id, removed, "Chat deleted");
        Ok(removed)
    }

    pub async fn list_models(&self) -> Result<Vec<String>> {
        let credentials = self.deps.settings.credentials().await?;
        Ok(self.deps.gateway.list_models(&credentials).await?)
    }

    pub fn previews(&self) -> PreviewAggregator {
        PreviewAggregator::new(self.deps.store.clone())
    }

    pub async fn chat_previews(&self) -> Result<Vec<ChatPreview>> {
        Ok(self.previews().previews().await?)
    }

    pub fn projector(&self) -> ViewStateProjector {
        ViewStateProjector::new(self.deps.store.clone())
    }
}
