// YandexGPT client implementation (HTTP direct, no SDK)

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Instant;

use crate::config::{Credentials, GatewayConfig};
use crate::error::{GatewayError, Result};
use crate::traits::CompletionGateway;
use crate::types::ChatMessage;
use crate::yandex::wire::{
    CompletionOptions, CompletionRequest, CompletionResponse, ErrorResponse, ModelsListResponse,
};

const FOLDER_HEADER: &str = "x-folder-id";
const PROJECT_HEADER: &str = "openai-project";

pub struct YandexGptClient {
    http_client: reqwest::Client,
    config: GatewayConfig,
}

impl YandexGptClient {
    /// Create client against the public endpoint
    pub fn new() -> Result<Self> {
        Self::with_config(GatewayConfig::default())
    }

    pub fn with_config(config: GatewayConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                GatewayError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Authorization plus the header carrying the scope id
    fn auth_headers(&self, credentials: &Credentials, scope_header: &'static str) -> Result<HeaderMap> {
        credentials.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", credentials.api_key.trim())).map_err(
                |_| GatewayError::Configuration("Invalid API key format".to_string()),
            )?,
        );
        headers.insert(
            HeaderName::from_static(scope_header),
            HeaderValue::from_str(credentials.scope_id.trim()).map_err(|_| {
                GatewayError::Configuration("Invalid folder ID format".to_string())
            })?,
        );
        Ok(headers)
    }

    /// Build completion request payload
    fn build_completion_request(
        &self,
        history: &[ChatMessage],
        credentials: &Credentials,
        model: Option<&str>,
    ) -> CompletionRequest {
        CompletionRequest {
            model_uri: self.config.model_uri(credentials.scope_id.trim(), model),
            completion_options: CompletionOptions::from(&self.config.completion),
            messages: history.to_vec(),
        }
    }

    /// Read the body of a successful response and decode it
    async fn decode_success<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::from_transport(e, &self.config.base_url))?;

        serde_json::from_str(&body).map_err(|e| GatewayError::MalformedResponse {
            detail: e.to_string(),
            body,
        })
    }

    /// Turn a non-success response into `Remote`, preferring the structured message
    async fn remote_error(&self, response: reqwest::Response) -> GatewayError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        remote_error_from_body(status, &body)
    }
}

fn remote_error_from_body(status: StatusCode, body: &str) -> GatewayError {
    let unknown = || format!("Unknown API error ({})", status.as_u16());
    let detail = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => parsed.detail().unwrap_or_else(unknown),
        Err(_) if body.trim().is_empty() => unknown(),
        Err(_) => body.to_string(),
    };

    GatewayError::Remote {
        status_code: status.as_u16(),
        detail,
    }
}

#[async_trait]
impl CompletionGateway for YandexGptClient {
    async fn send_message(
        &self,
        history: &[ChatMessage],
        credentials: &Credentials,
        model: Option<&str>,
    ) -> Result<ChatMessage> {
        if history.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "message history must not be empty".to_string(),
            ));
        }

        let headers = self.auth_headers(credentials, FOLDER_HEADER)?;
        let payload = self.build_completion_request(history, credentials, model);

        tracing::debug!(
            model_uri = %payload.model_uri,
            messages = payload.messages.len(),
            "Sending completion request"
        );
        let started = Instant::now();

        let response = self
            .http_client
            .post(self.config.completion_url())
            .headers(headers)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let err = GatewayError::from_transport(e, &self.config.base_url);
                tracing::warn!("Completion request failed: {}", err);
                err
            })?;

        let status = response.status();
        tracing::debug!(
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Completion response received"
        );

        if !status.is_success() {
            let err = self.remote_error(response).await;
            tracing::warn!("Completion API error: {}", err);
            return Err(err);
        }

        let raw: CompletionResponse = self.decode_success(response).await?;

        raw.result
            .alternatives
            .into_iter()
            .next()
            .map(|alternative| alternative.message)
            .ok_or(GatewayError::EmptyResponse)
    }

    async fn list_models(&self, credentials: &Credentials) -> Result<Vec<String>> {
        let headers = self.auth_headers(credentials, PROJECT_HEADER)?;

        let response = self
            .http_client
            .get(self.config.models_url())
            .headers(headers)
            .send()
            .await
            .map_err(|e| GatewayError::from_transport(e, &self.config.base_url))?;

        if !response.status().is_success() {
            let err = self.remote_error(response).await;
            tracing::warn!("Model listing failed: {}", err);
            return Err(err);
        }

        let raw: ModelsListResponse = self.decode_success(response).await?;
        Ok(raw.data.into_iter().map(|model| model.id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(YandexGptClient::new().is_ok());
    }

    #[test]
    fn test_build_completion_request() {
        let client = YandexGptClient::new().unwrap();
        let credentials = Credentials::new("key", "b1g");
        let history = vec![ChatMessage::system("Be brief"), ChatMessage::user("Hello")];

        let request = client.build_completion_request(&history, &credentials, None);
        assert_eq!(request.model_uri, "gpt://b1g/yandexgpt/latest");
        assert_eq!(request.messages, history);
        assert!(!request.completion_options.stream);
    }

    #[test]
    fn test_remote_error_structured() {
        let err = remote_error_from_body(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"Unknown api key","code":16}}"#,
        );
        assert_eq!(
            err,
            GatewayError::Remote {
                status_code: 401,
                detail: "Unknown api key".to_string()
            }
        );
    }

    #[test]
    fn test_remote_error_falls_back_to_raw_body() {
        let err = remote_error_from_body(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(
            err,
            GatewayError::Remote {
                status_code: 502,
                detail: "<html>bad gateway</html>".to_string()
            }
        );
    }

    #[test]
    fn test_remote_error_without_message() {
        let err = remote_error_from_body(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert!(matches!(
            err,
            GatewayError::Remote { status_code: 500, ref detail } if detail.contains("500")
        ));
    }

    #[test]
    fn test_auth_headers_reject_blank_credentials() {
        let client = YandexGptClient::new().unwrap();
        let err = client
            .auth_headers(&Credentials::new("", ""), FOLDER_HEADER)
            .unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));
    }
}
