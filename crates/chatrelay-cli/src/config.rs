use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use chatrelay_llm::{GatewayConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use chatrelay_types::SessionConfig;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewaySection,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default, skip_deserializing)]
    pub api_key: Option<String>,
    #[serde(default, skip_deserializing)]
    pub scope_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewaySection {
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.6,
            max_tokens: 2000,
            connect_timeout_secs: 10,
            request_timeout_secs: 60,
        }
    }
}

impl From<&GatewaySection> for GatewayConfig {
    fn from(section: &GatewaySection) -> Self {
        GatewayConfig::new()
            .with_base_url(section.base_url.as_str())
            .with_default_model(section.model.as_str())
            .with_temperature(section.temperature)
            .with_max_tokens(section.max_tokens)
            .with_connect_timeout(Duration::from_secs(section.connect_timeout_secs))
            .with_request_timeout(Duration::from_secs(section.request_timeout_secs))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Empty means in-memory
    pub database_url: String,
    /// Empty means settings are not persisted
    pub settings_path: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub system_prompt: Option<String>,
}

impl From<&SessionSection> for SessionConfig {
    fn from(section: &SessionSection) -> Self {
        match section.system_prompt.as_deref().map(str::trim) {
            Some(prompt) if !prompt.is_empty() => SessionConfig::new().with_system_prompt(prompt),
            _ => SessionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. CHATRELAY_<SECTION>__<KEY> environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let config = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("CHATRELAY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut cfg: Config = config.try_deserialize()?;
        cfg.load_secrets();
        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }

    fn load_secrets(&mut self) {
        let non_blank = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        self.api_key = non_blank("CHATRELAY_API_KEY");
        self.scope_id = non_blank("CHATRELAY_SCOPE_ID");
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig::from(&self.gateway)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::from(&self.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_structure() {
        let toml = r#"
            [gateway]
            base_url = "http://localhost:8080/"
            model = "yandexgpt-lite"
            temperature = 0.3
            max_tokens = 500
            connect_timeout_secs = 2
            request_timeout_secs = 30

            [storage]
            database_url = ""
            settings_path = "/tmp/settings.toml"

            [session]
            system_prompt = "Answer in one sentence."

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.gateway.max_tokens, 500);
        assert_eq!(config.logging.format, "json");

        let gateway = config.gateway_config();
        assert_eq!(gateway.base_url, "http://localhost:8080");
        assert_eq!(gateway.default_model, "yandexgpt-lite");
        assert_eq!(gateway.completion.max_tokens, "500");
        assert_eq!(gateway.request_timeout, Duration::from_secs(30));

        assert_eq!(config.session_config().system_prompt, "Answer in one sentence.");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.gateway.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.gateway.temperature, 0.6);
        assert!(config.storage.database_url.is_empty());
        assert_eq!(config.session_config(), SessionConfig::default());
        assert_eq!(config.api_key, None);
    }
}
