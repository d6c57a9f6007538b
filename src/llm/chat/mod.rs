pub mod gemini;

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use self::gemini::GeminiChatClient;
use super::LlmConfig;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    /// First text part of the first candidate, if the provider returned one.
    pub response: Option<String>,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{message}")]
    Upstream {
        status: u16,
        message: String,
    },

    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    #[error("invalid provider payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid provider url: {0}")]
    Url(#[from] url::ParseError),
}

impl From<reqwest::Error> for LlmError {
    /// Drops the request URL, which carries the provider key.
    fn from(e: reqwest::Error) -> Self {
        LlmError::Transport(e.without_url())
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, LlmError>;

    fn get_model(&self) -> String;
}

/// Builds the chat client, or `None` when no API key is configured.
pub fn new_client(config: &LlmConfig) -> Option<Arc<dyn ChatClient>> {
    let client = GeminiChatClient::from_config(config)?;
    Some(Arc::new(client))
}
