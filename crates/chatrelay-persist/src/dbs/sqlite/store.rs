use async_trait::async_trait;
use chatrelay_types::{Chat, Message, Origin, StoreEvent};
use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tokio::sync::{broadcast, Mutex};

use super::pool::DatabasePool;
use crate::error::{PersistError, Result};
use crate::notify::{ChangeBus, DEFAULT_EVENT_CAPACITY};
use crate::trait_client::MessageStore;

/// SQLite-backed store.
///
/// Timestamps are stored as epoch milliseconds; equal timestamps are ordered
/// by `rowid`, which follows insertion order.
pub struct SqliteStore {
    pool: DatabasePool,
    bus: ChangeBus,
    /// Held across commit and publish
    write_lock: Mutex<()>,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = DatabasePool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    pub fn new(pool: DatabasePool) -> Self {
        Self {
            pool,
            bus: ChangeBus::new(DEFAULT_EVENT_CAPACITY),
            write_lock: Mutex::new(()),
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

const MESSAGE_COLUMNS: &str = "id, text, is_from_user, timestamp";

fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| PersistError::Internal(format!("timestamp out of range: {millis}")))
}

fn chat_from_row(row: &SqliteRow) -> Result<Chat> {
    Ok(Chat {
        id: row.try_get("id")?,
        created_at: from_millis(row.try_get("created_at")?)?,
    })
}

fn message_from_row(row: &SqliteRow) -> Result<Message> {
    let is_from_user: bool = row.try_get("is_from_user")?;
    Ok(Message {
        id: row.try_get("id")?,
        text: row.try_get("text")?,
        origin: if is_from_user {
            Origin::User
        } else {
            Origin::Assistant
        },
        timestamp: from_millis(row.try_get("timestamp")?)?,
    })
}

impl SqliteStore {
    async fn fetch_message(&self, chat_id: &str, order: &str) -> Result<Option<Message>> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE chat_id = ? \
             ORDER BY timestamp {order}, rowid {order} LIMIT 1"
        );
        sqlx::query(&sql)
            .bind(chat_id)
            .fetch_optional(&self.pool.reader)
            .await?
            .as_ref()
            .map(message_from_row)
            .transpose()
    }
}

// ---------------------------------------------------------------------------
// MessageStore impl
// ---------------------------------------------------------------------------

#[async_trait]
impl MessageStore for SqliteStore {
    async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>> {
        sqlx::query("SELECT id, created_at FROM chats WHERE id = ?")
            .bind(chat_id)
            .fetch_optional(&self.pool.reader)
            .await?
            .as_ref()
            .map(chat_from_row)
            .transpose()
    }

    async fn create_chat(&self, chat_id: &str) -> Result<Chat> {
        let _guard = self.write_lock.lock().await;

        let inserted = sqlx::query(
            "INSERT INTO chats (id, created_at) VALUES (?, ?) ON CONFLICT(id) DO NOTHING",
        )
        .bind(chat_id)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool.writer)
        .await?
        .rows_affected()
            > 0;

        let row = sqlx::query("SELECT id, created_at FROM chats WHERE id = ?")
            .bind(chat_id)
            .fetch_one(&self.pool.writer)
            .await?;
        let chat = chat_from_row(&row)?;

        if inserted {
            tracing::debug!(chat_id = %chat_id, "Chat created");
            self.bus.publish(StoreEvent::ChatCreated {
                chat_id: chat_id.to_string(),
            });
        }
        Ok(chat)
    }

    async fn list_chats(&self) -> Result<Vec<Chat>> {
        sqlx::query("SELECT id, created_at FROM chats ORDER BY created_at DESC, rowid DESC")
            .fetch_all(&self.pool.reader)
            .await?
            .iter()
            .map(chat_from_row)
            .collect()
    }

    async fn append_message(&self, chat_id: &str, message: Message) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.writer.begin().await?;

        let exists = sqlx::query("SELECT 1 FROM chats WHERE id = ?")
            .bind(chat_id)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if !exists {
            return Err(PersistError::NotFound(chat_id.to_string()));
        }

        let duplicate = sqlx::query("SELECT 1 FROM messages WHERE id = ?")
            .bind(&message.id)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if duplicate {
            return Err(PersistError::DuplicateMessage {
                chat_id: chat_id.to_string(),
                message_id: message.id,
            });
        }

        sqlx::query(
            "INSERT INTO messages (id, chat_id, text, is_from_user, timestamp) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&message.id)
        .bind(chat_id)
        .bind(&message.text)
        .bind(message.is_from_user())
        .bind(message.timestamp.timestamp_millis())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.bus.publish(StoreEvent::MessageAppended {
            chat_id: chat_id.to_string(),
            message,
        });
        Ok(())
    }

    async fn messages_for_chat(&self, chat_id: &str) -> Result<Vec<Message>> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE chat_id = ? ORDER BY timestamp ASC, rowid ASC"
        );
        sqlx::query(&sql)
            .bind(chat_id)
            .fetch_all(&self.pool.reader)
            .await?
            .iter()
            .map(message_from_row)
            .collect()
    }

    async fn last_message(&self, chat_id: &str) -> Result<Option<Message>> {
        self.fetch_message(chat_id, "DESC").await
    }

    async fn first_message(&self, chat_id: &str) -> Result<Option<Message>> {
        self.fetch_message(chat_id, "ASC").await
    }

    async fn delete_chat(&self, chat_id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.writer.begin().await?;

        sqlx::query("DELETE FROM messages WHERE chat_id = ?")
            .bind(chat_id)
            .execute(&mut *tx)
            .await?;
        let removed = sqlx::query("DELETE FROM chats WHERE id = ?")
            .bind(chat_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        tx.commit().await?;

        if removed {
            tracing::debug!(chat_id = %chat_id, "Chat deleted");
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
