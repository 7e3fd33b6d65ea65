//! Live query streams over a [`MessageStore`].
//!
//! Each stream yields the current result first, then a fresh result after
//! every relevant change. A lagged receiver falls back to a plain re-query,
//! so no change is ever missed even when intermediate snapshots are.

use std::sync::Arc;

use async_stream::stream;
use chatrelay_types::{Chat, Message, StoreEvent};
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;

use crate::error::Result;
use crate::trait_client::MessageStore;

/// Ordered messages of one chat, re-emitted after each write touching it
pub fn watch_messages(
    store: Arc<dyn MessageStore>,
    chat_id: impl Into<String>,
) -> impl Stream<Item = Result<Vec<Message>>> + Send + 'static {
    let chat_id = chat_id.into();
    stream! {
        // Subscribe before the first read so no write falls in between
        let mut events = store.subscribe();
        yield store.messages_for_chat(&chat_id).await;

        loop {
            match events.recv().await {
                Ok(event) if event.concerns(&chat_id) => {
                    yield store.messages_for_chat(&chat_id).await;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(chat_id = %chat_id, skipped, "Message watcher lagged, re-querying");
                    yield store.messages_for_chat(&chat_id).await;
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}

/// Chat list, re-emitted whenever a chat is created or deleted
pub fn watch_chats(
    store: Arc<dyn MessageStore>,
) -> impl Stream<Item = Result<Vec<Chat>>> + Send + 'static {
    stream! {
        let mut events = store.subscribe();
        yield store.list_chats().await;

        loop {
            match events.recv().await {
                Ok(StoreEvent::MessageAppended { .. }) => {}
                Ok(_) => {
                    yield store.list_chats().await;
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Chat watcher lagged, re-querying");
                    yield store.list_chats().await;
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}
