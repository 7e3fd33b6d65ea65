pub mod config;
pub mod error;
pub mod traits;
pub mod types;
pub mod yandex;

pub use config::{CompletionSettings, Credentials, GatewayConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::{GatewayError, HOST_UNREACHABLE_HINT};
pub use traits::CompletionGateway;
pub use types::{ChatMessage, Role};
pub use yandex::YandexGptClient;
