//! Key-value settings holding credentials and the model selection.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chatrelay_llm::Credentials;
use tokio::sync::Mutex;

use crate::error::{PersistError, Result};

pub const KEY_API_KEY: &str = "api_key";
pub const KEY_SCOPE_ID: &str = "scope_id";
pub const KEY_MODEL: &str = "model";

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

#[derive(Default)]
pub struct MemorySettings {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.lock().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.values.lock().await.clear();
        Ok(())
    }
}

/// Settings persisted as a flat TOML table, rewritten on every change
pub struct FileSettings {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileSettings {
    /// Load `path` if it exists, otherwise start empty
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => toml::from_str(&raw).map_err(|e| {
                PersistError::Settings(format!("Failed to parse {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(PersistError::Settings(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let raw = toml::to_string(values)
            .map_err(|e| PersistError::Settings(format!("Failed to encode settings: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                PersistError::Settings(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        tokio::fs::write(&self.path, raw).await.map_err(|e| {
            PersistError::Settings(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

#[async_trait]
impl SettingsStore for FileSettings {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().await;
        values.insert(key.to_string(), value.to_string());
        self.flush(&values).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().await;
        if values.remove(key).is_some() {
            self.flush(&values).await?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut values = self.values.lock().await;
        values.clear();
        self.flush(&values).await
    }
}

/// Typed view over a [`SettingsStore`]
#[derive(Clone)]
pub struct Settings {
    store: Arc<dyn SettingsStore>,
}

impl Settings {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySettings::new()))
    }

    pub async fn api_key(&self) -> Result<Option<String>> {
        self.store.get(KEY_API_KEY).await
    }

    pub async fn set_api_key(&self, api_key: &str) -> Result<()> {
        self.store.set(KEY_API_KEY, api_key.trim()).await
    }

    pub async fn scope_id(&self) -> Result<Option<String>> {
        self.store.get(KEY_SCOPE_ID).await
    }

    pub async fn set_scope_id(&self, scope_id: &str) -> Result<()> {
        self.store.set(KEY_SCOPE_ID, scope_id.trim()).await
    }

    /// Selected model, `None` when the gateway default applies
    pub async fn model(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(KEY_MODEL)
            .await?
            .filter(|m| !m.trim().is_empty()))
    }

    /// A blank value resets to the default model
    pub async fn set_model(&self, model: &str) -> Result<()> {
        let model = model.trim();
        if model.is_empty() {
            self.store.remove(KEY_MODEL).await
        } else {
            self.store.set(KEY_MODEL, model).await
        }
    }

    /// Current credentials. Missing values come back empty and are
    /// rejected by the gateway before any request.
    pub async fn credentials(&self) -> Result<Credentials> {
        Ok(Credentials::new(
            self.api_key().await?.unwrap_or_default(),
            self.scope_id().await?.unwrap_or_default(),
        ))
    }

    pub async fn clear_all(&self) -> Result<()> {
        self.store.clear().await
    }
}
