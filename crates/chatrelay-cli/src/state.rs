use std::sync::Arc;

use anyhow::Context;
use chatrelay_llm::YandexGptClient;
use chatrelay_persist::{FileSettings, Settings, StoreBuilder};
use chatrelay_session::SessionManager;

use crate::config::Config;

/// Everything the REPL needs, wired from configuration
pub struct AppState {
    pub config: Arc<Config>,
    pub manager: Arc<SessionManager>,
}

impl AppState {
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let store = StoreBuilder::new()
            .database_url(config.storage.database_url.as_str())
            .build()
            .await
            .context("Failed to open message store")?;

        let settings = open_settings(&config).await?;

        let gateway = YandexGptClient::with_config(config.gateway_config())
            .context("Failed to create completion client")?;

        let manager = SessionManager::builder()
            .store(store)
            .gateway(Arc::new(gateway))
            .settings(settings)
            .config(config.session_config())
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            manager: Arc::new(manager),
        })
    }
}

/// File-backed settings when a path is configured, seeded with secrets
/// from the environment
async fn open_settings(config: &Config) -> anyhow::Result<Settings> {
    let settings = if config.storage.settings_path.trim().is_empty() {
        Settings::in_memory()
    } else {
        let file = FileSettings::open(config.storage.settings_path.trim())
            .await
            .context("Failed to open settings file")?;
        tracing::info!(path = %file.path().display(), "Settings loaded");
        Settings::new(Arc::new(file))
    };

    if let Some(api_key) = &config.api_key {
        settings.set_api_key(api_key).await?;
    }
    if let Some(scope_id) = &config.scope_id {
        settings.set_scope_id(scope_id).await?;
    }
    Ok(settings)
}
