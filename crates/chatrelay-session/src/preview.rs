use std::sync::Arc;

use async_stream::stream;
use chatrelay_persist::{MessageStore, PersistError};
use chatrelay_types::{Chat, ChatPreview, Message};
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;

/// Builds the chat list.
///
/// The representative text of a chat is its most recent message. Previews
/// are sorted by last activity, newest first.
#[derive(Clone)]
pub struct PreviewAggregator {
    store: Arc<dyn MessageStore>,
}

impl PreviewAggregator {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    pub async fn previews(&self) -> Result<Vec<ChatPreview>, PersistError> {
        collect_previews(self.store.as_ref()).await
    }

    /// Current previews, then a recomputed list after every store change
    pub fn watch(&self) -> impl Stream<Item = Result<Vec<ChatPreview>, PersistError>> + Send + 'static {
        let store = self.store.clone();
        stream! {
            let mut events = store.subscribe();
            yield collect_previews(store.as_ref()).await;

            loop {
                match events.recv().await {
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Preview watcher lagged, recomputing");
                    }
                    Err(RecvError::Closed) => break,
                }
                yield collect_previews(store.as_ref()).await;
            }
        }
    }
}

async fn collect_previews(store: &dyn MessageStore) -> Result<Vec<ChatPreview>, PersistError> {
    let chats = store.list_chats().await?;
    let mut previews = Vec::with_capacity(chats.len());
    for chat in chats {
        let last = store.last_message(&chat.id).await?;
        previews.push(preview_for(chat, last));
    }
    sort_previews(&mut previews);
    Ok(previews)
}

pub fn preview_for(chat: Chat, last: Option<Message>) -> ChatPreview {
    let (text, last_activity) = match last {
        Some(message) => (Some(message.text), message.timestamp),
        None => (None, chat.created_at),
    };
    ChatPreview {
        chat_id: chat.id,
        text,
        last_activity,
        created_at: chat.created_at,
        unread_count: 0,
    }
}

/// Newest activity first; equal activity keeps the newer chat first
pub fn sort_previews(previews: &mut [ChatPreview]) {
    previews.sort_by(|a, b| {
        b.last_activity
            .cmp(&a.last_activity)
            .then(b.created_at.cmp(&a.created_at))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatrelay_persist::MemoryStore;
    use chatrelay_types::Origin;
    use chrono::{Duration, Utc};
    use futures::StreamExt;

    #[test]
    fn test_preview_without_messages_uses_creation_time() {
        let chat = Chat::new("c1");
        let preview = preview_for(chat.clone(), None);
        assert_eq!(preview.last_activity, chat.created_at);
        assert_eq!(preview.display_text(), "New chat");
        assert_eq!(preview.unread_count, 0);
    }

    #[tokio::test]
    async fn test_previews_sorted_by_activity() {
        let store: Arc<dyn MessageStore> = Arc::new(MemoryStore::new());
        store.create_chat("old").await.unwrap();
        store.create_chat("new").await.unwrap();

        // The older chat gets the most recent message
        let later = Utc::now() + Duration::seconds(5);
        store
            .append_message("old", Message::new("x".repeat(50), Origin::User, later))
            .await
            .unwrap();

        let previews = PreviewAggregator::new(store).previews().await.unwrap();
        let ids: Vec<&str> = previews.iter().map(|p| p.chat_id.as_str()).collect();
        assert_eq!(ids, vec!["old", "new"]);
        assert_eq!(previews[0].display_text(), format!("{}...", "x".repeat(40)));
        assert_eq!(previews[0].last_activity, later);
    }

    #[tokio::test]
    async fn test_watch_recomputes_on_any_change() {
        let store: Arc<dyn MessageStore> = Arc::new(MemoryStore::new());
        let aggregator = PreviewAggregator::new(store.clone());
        let mut stream = Box::pin(aggregator.watch());

        assert!(stream.next().await.unwrap().unwrap().is_empty());

        store.create_chat("c1").await.unwrap();
        let created = stream.next().await.unwrap().unwrap();
        assert_eq!(created[0].text, None);

        store.append_message("c1", Message::user("Hello")).await.unwrap();
        let appended = stream.next().await.unwrap().unwrap();
        assert_eq!(appended[0].text.as_deref(), Some("Hello"));

        store.delete_chat("c1").await.unwrap();
        assert!(stream.next().await.unwrap().unwrap().is_empty());
    }
}
