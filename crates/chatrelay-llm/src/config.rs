// Configuration layer for the completion gateway.
// Credentials are passed per call; everything else is fixed at client construction.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{GatewayError, Result};

pub const DEFAULT_BASE_URL: &str = "https://llm.api.cloud.yandex.net";
pub const DEFAULT_MODEL: &str = "yandexgpt";

const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";
const PLACEHOLDER_SCOPE_ID: &str = "YOUR_FOLDER_ID_HERE";

/// Static bearer credentials for the completion service
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub api_key: String,
    /// Folder (scope) identifier the model is billed to
    pub scope_id: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, scope_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            scope_id: scope_id.into(),
        }
    }

    /// Reject blank or placeholder values
    pub fn validate(&self) -> Result<()> {
        let api_key = self.api_key.trim();
        if api_key.is_empty() || api_key == PLACEHOLDER_API_KEY {
            return Err(GatewayError::Configuration(
                "API key is not configured".to_string(),
            ));
        }
        let scope_id = self.scope_id.trim();
        if scope_id.is_empty() || scope_id == PLACEHOLDER_SCOPE_ID {
            return Err(GatewayError::Configuration(
                "Folder ID is not configured".to_string(),
            ));
        }
        Ok(())
    }
}

// Keep the key out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"***")
            .field("scope_id", &self.scope_id)
            .finish()
    }
}

/// Settings sent in `completionOptions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSettings {
    pub temperature: f64,
    /// The API takes this as a string
    pub max_tokens: String,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            temperature: 0.6,
            max_tokens: "2000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    pub completion_path: String,
    pub models_path: String,
    pub default_model: String,
    #[serde(default)]
    pub completion: CompletionSettings,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            completion_path: "/foundationModels/v1/completion".to_string(),
            models_path: "/v1/models".to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            completion: CompletionSettings::default(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl GatewayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.completion.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.completion.max_tokens = max_tokens.to_string();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn completion_url(&self) -> String {
        format!("{}{}", self.base_url, self.completion_path)
    }

    pub fn models_url(&self) -> String {
        format!("{}{}", self.base_url, self.models_path)
    }

    /// Build the `modelUri` for a request.
    ///
    /// A bare model name is expanded to `gpt://{scope}/{name}/latest`;
    /// a value that already is a URI is passed through.
    pub fn model_uri(&self, scope_id: &str, model: Option<&str>) -> String {
        let model = model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.default_model);

        if model.contains("://") {
            model.to_string()
        } else {
            format!("gpt://{}/{}/latest", scope_id, model)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_credentials_rejected() {
        let err = Credentials::new("  ", "folder").validate().unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));

        let err = Credentials::new("key", "").validate().unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));
    }

    #[test]
    fn test_placeholder_credentials_rejected() {
        let err = Credentials::new("YOUR_API_KEY_HERE", "b1g").validate();
        assert!(err.is_err());

        let err = Credentials::new("key", "YOUR_FOLDER_ID_HERE").validate();
        assert!(err.is_err());
    }

    #[test]
    fn test_valid_credentials() {
        assert!(Credentials::new("key", "b1gfolder").validate().is_ok());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let rendered = format!("{:?}", Credentials::new("secret-key", "b1g"));
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("b1g"));
    }

    #[test]
    fn test_model_uri_default() {
        let config = GatewayConfig::default();
        assert_eq!(config.model_uri("b1g", None), "gpt://b1g/yandexgpt/latest");
        assert_eq!(config.model_uri("b1g", Some(" ")), "gpt://b1g/yandexgpt/latest");
    }

    #[test]
    fn test_model_uri_bare_name() {
        let config = GatewayConfig::default();
        assert_eq!(
            config.model_uri("b1g", Some("yandexgpt-lite")),
            "gpt://b1g/yandexgpt-lite/latest"
        );
    }

    #[test]
    fn test_model_uri_passthrough() {
        let config = GatewayConfig::default();
        assert_eq!(
            config.model_uri("b1g", Some("gpt://other/yandexgpt/rc")),
            "gpt://other/yandexgpt/rc"
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = GatewayConfig::new().with_base_url("http://localhost:1234/");
        assert_eq!(
            config.completion_url(),
            "http://localhost:1234/foundationModels/v1/completion"
        );
        assert_eq!(config.models_url(), "http://localhost:1234/v1/models");
    }
}
