use thiserror::Error;

/// Remediation shown when the API host cannot be resolved or reached.
pub const HOST_UNREACHABLE_HINT: &str = "the YandexGPT service may not be activated in this folder; \
also check the network connection and the configured endpoint";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Missing or placeholder credentials. Raised before any network attempt.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Success status, but the alternatives list was empty
    #[error("Empty response from completion API")]
    EmptyResponse,

    /// Success status, but the body could not be decoded
    #[error("Failed to decode API response: {detail}. Response body: {body}")]
    MalformedResponse { detail: String, body: String },

    /// Non-success HTTP status
    #[error("API error ({status_code}): {detail}")]
    Remote { status_code: u16, detail: String },

    #[error("Unable to reach '{host}': {hint}")]
    HostUnreachable { host: String, hint: String },

    #[error("Could not connect to the server. Check the internet connection.")]
    ConnectTimeout,

    #[error("Timed out waiting for the server response.")]
    ReadTimeout,

    #[error("Request failed: {message}")]
    UnknownTransport { message: String },
}

impl GatewayError {
    /// Whether the failure happened below HTTP (DNS, connect, timeouts)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::HostUnreachable { .. }
                | Self::ConnectTimeout
                | Self::ReadTimeout
                | Self::UnknownTransport { .. }
        )
    }

    /// Classify a reqwest failure that happened before a response arrived
    pub(crate) fn from_transport(err: reqwest::Error, host: &str) -> Self {
        if err.is_connect() && err.is_timeout() {
            Self::ConnectTimeout
        } else if err.is_connect() {
            Self::HostUnreachable {
                host: host.to_string(),
                hint: HOST_UNREACHABLE_HINT.to_string(),
            }
        } else if err.is_timeout() {
            Self::ReadTimeout
        } else {
            Self::UnknownTransport {
                message: err.to_string(),
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
