use async_trait::async_trait;

use crate::config::Credentials;
use crate::error::Result;
use crate::types::ChatMessage;

/// Stateless adapter to a remote completion service.
///
/// One call maps to exactly one outbound request. Implementations never retry.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Send the full history and return the assistant's reply.
    ///
    /// `model` overrides the configured default model when present.
    async fn send_message(
        &self,
        history: &[ChatMessage],
        credentials: &Credentials,
        model: Option<&str>,
    ) -> Result<ChatMessage>;

    /// List identifiers of the models available to these credentials
    async fn list_models(&self, credentials: &Credentials) -> Result<Vec<String>>;
}
