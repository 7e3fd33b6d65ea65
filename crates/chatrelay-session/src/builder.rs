use std::sync::Arc;

use chatrelay_llm::CompletionGateway;
use chatrelay_persist::{MessageStore, Settings};
use chatrelay_types::SessionConfig;

use crate::error::{Result, SessionError};
use crate::manager::SessionManager;

/// Builder for a [`SessionManager`]
pub struct SessionManagerBuilder {
    store: Option<Arc<dyn MessageStore>>,
    gateway: Option<Arc<dyn CompletionGateway>>,
    settings: Option<Settings>,
    config: SessionConfig,
}

impl SessionManagerBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            gateway: None,
            settings: None,
            config: SessionConfig::default(),
        }
    }

    pub fn store(mut self, store: Arc<dyn MessageStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn gateway(mut self, gateway: Arc<dyn CompletionGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Defaults to empty in-memory settings
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config = self.config.with_system_prompt(prompt);
        self
    }

    pub fn build(self) -> Result<SessionManager> {
        let store = self.store.ok_or(SessionError::MissingComponent("message store"))?;
        let gateway = self
            .gateway
            .ok_or(SessionError::MissingComponent("completion gateway"))?;

        Ok(SessionManager::new(
            store,
            gateway,
            self.settings.unwrap_or_else(Settings::in_memory),
            self.config,
        ))
    }
}

impl Default for SessionManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
