use std::sync::Arc;

use crate::dbs::MemoryStore;
use crate::error::Result;
use crate::notify::DEFAULT_EVENT_CAPACITY;
use crate::trait_client::MessageStore;

/// Picks a store backend from configuration.
///
/// Without a database URL the store lives in memory.
pub struct StoreBuilder {
    database_url: Option<String>,
    event_capacity: usize,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self {
            database_url: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into()).filter(|u| !u.trim().is_empty());
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub async fn build(self) -> Result<Arc<dyn MessageStore>> {
        match self.database_url {
            None => {
                tracing::info!("Using in-memory message store");
                Ok(Arc::new(MemoryStore::with_event_capacity(self.event_capacity)))
            }
            Some(url) => Self::connect(&url).await,
        }
    }

    #[cfg(feature = "sqlite")]
    async fn connect(url: &str) -> Result<Arc<dyn MessageStore>> {
        tracing::info!(url = %url, "Opening SQLite message store");
        Ok(Arc::new(crate::dbs::SqliteStore::connect(url).await?))
    }

    #[cfg(not(feature = "sqlite"))]
    async fn connect(url: &str) -> Result<Arc<dyn MessageStore>> {
        Err(crate::error::PersistError::Internal(format!(
            "database url {url} given but sqlite support is not compiled in"
        )))
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_url_means_memory() {
        let store = StoreBuilder::new().database_url("  ").build().await.unwrap();
        store.create_chat("c1").await.unwrap();
        assert!(store.get_chat("c1").await.unwrap().is_some());
    }
}
