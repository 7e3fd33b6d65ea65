use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chatrelay_types::{Chat, Message, StoreEvent};
use tokio::sync::broadcast;

use crate::error::{PersistError, Result};
use crate::notify::{ChangeBus, DEFAULT_EVENT_CAPACITY};
use crate::trait_client::MessageStore;

struct ChatEntry {
    chat: Chat,
    /// Insertion sequence, breaks ties between equal creation times
    seq: u64,
    messages: Vec<Message>,
}

#[derive(Default)]
struct Inner {
    chats: HashMap<String, ChatEntry>,
    next_seq: u64,
}

/// In-process store. Contents live as long as the value.
pub struct MemoryStore {
    inner: Mutex<Inner>,
    bus: ChangeBus,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_event_capacity(DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_event_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            bus: ChangeBus::new(capacity),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| PersistError::Internal("memory store lock poisoned".to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>> {
        Ok(self.lock()?.chats.get(chat_id).map(|entry| entry.chat.clone()))
    }

    async fn create_chat(&self, chat_id: &str) -> Result<Chat> {
        let mut inner = self.lock()?;
        if let Some(entry) = inner.chats.get(chat_id) {
            return Ok(entry.chat.clone());
        }

        let chat = Chat::new(chat_id);
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.chats.insert(
            chat_id.to_string(),
            ChatEntry {
                chat: chat.clone(),
                seq,
                messages: Vec::new(),
            },
        );

        // Still under the lock: keeps event order equal to commit order
        self.bus.publish(StoreEvent::ChatCreated {
            chat_id: chat_id.to_string(),
        });
        Ok(chat)
    }

    async fn list_chats(&self) -> Result<Vec<Chat>> {
        let inner = self.lock()?;
        let mut entries: Vec<&ChatEntry> = inner.chats.values().collect();
        entries.sort_by(|a, b| {
            b.chat
                .created_at
                .cmp(&a.chat.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(entries.into_iter().map(|entry| entry.chat.clone()).collect())
    }

    async fn append_message(&self, chat_id: &str, message: Message) -> Result<()> {
        let mut inner = self.lock()?;
        let entry = inner
            .chats
            .get_mut(chat_id)
            .ok_or_else(|| PersistError::NotFound(chat_id.to_string()))?;

        if entry.messages.iter().any(|m| m.id == message.id) {
            return Err(PersistError::DuplicateMessage {
                chat_id: chat_id.to_string(),
                message_id: message.id,
            });
        }

        // After every message with an equal or earlier timestamp
        let position = entry
            .messages
            .partition_point(|m| m.timestamp <= message.timestamp);
        entry.messages.insert(position, message.clone());

        self.bus.publish(StoreEvent::MessageAppended {
            chat_id: chat_id.to_string(),
            message,
        });
        Ok(())
    }

    async fn messages_for_chat(&self, chat_id: &str) -> Result<Vec<Message>> {
        Ok(self
            .lock()?
            .chats
            .get(chat_id)
            .map(|entry| entry.messages.clone())
            .unwrap_or_default())
    }

    async fn last_message(&self, chat_id: &str) -> Result<Option<Message>> {
        Ok(self
            .lock()?
            .chats
            .get(chat_id)
            .and_then(|entry| entry.messages.last().cloned()))
    }

    async fn first_message(&self, chat_id: &str) -> Result<Option<Message>> {
        Ok(self
            .lock()?
            .chats
            .get(chat_id)
            .and_then(|entry| entry.messages.first().cloned()))
    }

    async fn delete_chat(&self, chat_id: &str) -> Result<bool> {
        let mut inner = self.lock()?;
        let removed = inner.chats.remove(chat_id).is_some();
        if removed {
            self.bus.publish(StoreEvent::ChatDeleted {
                chat_id: chat_id.to_string(),
            });
        }
        Ok(removed)
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.bus.subscribe()
    }
}
