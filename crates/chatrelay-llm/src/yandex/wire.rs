// YandexGPT foundation models API wire format
// https://yandex.cloud/docs/foundation-models/concepts/yandexgpt/

use serde::{Deserialize, Serialize};

use crate::config::CompletionSettings;
use crate::types::ChatMessage;

/// Body of `POST /foundationModels/v1/completion`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub model_uri: String,
    pub completion_options: CompletionOptions,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOptions {
    pub stream: bool,
    pub temperature: f64,
    pub max_tokens: String,
}

impl From<&CompletionSettings> for CompletionOptions {
    fn from(settings: &CompletionSettings) -> Self {
        Self {
            stream: false,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens.clone(),
        }
    }
}

/// Success envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub result: CompletionResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    pub alternatives: Vec<Alternative>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alternative {
    pub message: ChatMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Token counts arrive as strings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(default)]
    pub input_text_tokens: Option<String>,
    #[serde(default)]
    pub completion_tokens: Option<String>,
    #[serde(default)]
    pub total_tokens: Option<String>,
}

/// Error envelope: either `{error: {message, code}}` or a flat `{message, code}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<ErrorDetails>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorDetails {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
}

impl ErrorResponse {
    /// Most specific message carried by the envelope
    pub fn detail(&self) -> Option<String> {
        self.error
            .as_ref()
            .and_then(|e| e.message.clone())
            .or_else(|| self.message.clone())
            .filter(|m| !m.trim().is_empty())
    }
}

/// Body of `GET /v1/models` (OpenAI-compatible listing)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsListResponse {
    pub data: Vec<ModelInfo>,
    #[serde(rename = "object", default = "default_list_object")]
    pub object_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(rename = "object", default = "default_model_object")]
    pub object_type: String,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub owned_by: Option<String>,
}

fn default_list_object() -> String {
    "list".to_string()
}

fn default_model_object() -> String {
    "model".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn test_request_uses_camel_case() {
        let request = CompletionRequest {
            model_uri: "gpt://b1g/yandexgpt/latest".to_string(),
            completion_options: CompletionOptions::from(&CompletionSettings::default()),
            messages: vec![ChatMessage::user("Hello")],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["modelUri"], "gpt://b1g/yandexgpt/latest");
        assert_eq!(json["completionOptions"]["stream"], false);
        assert_eq!(json["completionOptions"]["temperature"], 0.6);
        assert_eq!(json["completionOptions"]["maxTokens"], "2000");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["text"], "Hello");
    }

    #[test]
    fn test_response_with_optional_fields_missing() {
        let body = r#"{"result":{"alternatives":[{"message":{"role":"assistant","text":"Hi there"}}]}}"#;
        let response: CompletionResponse = serde_json::from_str(body).unwrap();
        let first = &response.result.alternatives[0];
        assert_eq!(first.message.role, Role::Assistant);
        assert_eq!(first.message.text, "Hi there");
        assert!(response.result.usage.is_none());
    }

    #[test]
    fn test_error_detail_prefers_nested_message() {
        let nested: ErrorResponse =
            serde_json::from_str(r#"{"error":{"message":"bad key","code":16}}"#).unwrap();
        assert_eq!(nested.detail().as_deref(), Some("bad key"));

        let flat: ErrorResponse =
            serde_json::from_str(r#"{"message":"quota exceeded","code":8}"#).unwrap();
        assert_eq!(flat.detail().as_deref(), Some("quota exceeded"));

        let empty: ErrorResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.detail(), None);
    }

    #[test]
    fn test_models_list_defaults() {
        let body = r#"{"data":[{"id":"yandexgpt"},{"id":"yandexgpt-lite","owned_by":"yandex"}]}"#;
        let list: ModelsListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(list.object_type, "list");
        assert_eq!(list.data.len(), 2);
        assert_eq!(list.data[1].owned_by.as_deref(), Some("yandex"));
    }
}
