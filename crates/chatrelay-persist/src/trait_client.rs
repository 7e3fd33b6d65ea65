use async_trait::async_trait;
use chatrelay_types::{Chat, Message, StoreEvent};
use tokio::sync::broadcast;

use crate::error::Result;

/// Durable per-chat message log plus chat metadata.
///
/// Implementations publish a [`StoreEvent`] after every committed write,
/// in commit order.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>>;

    /// Create the chat if absent. An existing chat is returned unchanged.
    async fn create_chat(&self, chat_id: &str) -> Result<Chat>;

    /// All chats, newest first
    async fn list_chats(&self) -> Result<Vec<Chat>>;

    /// Append a message to an existing chat.
    ///
    /// Fails with `PersistError::NotFound` when the chat does not exist.
    async fn append_message(&self, chat_id: &str, message: Message) -> Result<()>;

    /// Messages ordered by timestamp ascending, ties in insertion order.
    /// Unknown chats yield an empty list.
    async fn messages_for_chat(&self, chat_id: &str) -> Result<Vec<Message>>;

    async fn last_message(&self, chat_id: &str) -> Result<Option<Message>>;

    async fn first_message(&self, chat_id: &str) -> Result<Option<Message>>;

    /// Remove the chat and all its messages in one step.
    ///
    /// Returns whether a chat was removed.
    async fn delete_chat(&self, chat_id: &str) -> Result<bool>;

    /// Change notifications for writes committed after this call
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}
