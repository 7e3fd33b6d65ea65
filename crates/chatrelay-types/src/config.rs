use serde::{Deserialize, Serialize};

/// System instruction prepended to every completion request.
///
/// It is injected at request time only and never written to the message log.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. \
Answer clearly and concisely in the language the user writes in.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub system_prompt: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }
}
