//! Single-prompt relay to the configured chat provider.
//!
//! One request produces one upstream call at most, with no retries. Every failure
//! is normalized into a [`RelayError`], whose `Display` text is the only
//! detail a caller ever sees.

use async_trait::async_trait;
use axum::{ http::StatusCode, response::{ IntoResponse, Response }, Json };
use log::{ error, info, warn };
use std::sync::Arc;
use thiserror::Error;

use crate::llm::chat::{ ChatClient, LlmError };
use crate::models::relay::ErrorBody;

pub const NO_RESPONSE_FALLBACK: &str = "No response from AI";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("Message is required")]
    InvalidRequest,

    #[error("API key not configured")]
    Configuration,

    #[error("{message}")]
    Upstream {
        status: u16,
        message: String,
    },

    #[error("Server error")]
    Server,
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::InvalidRequest => StatusCode::BAD_REQUEST,
            RelayError::Configuration | RelayError::Server => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::Upstream { status, .. } =>
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
        }
    }
}

impl From<LlmError> for RelayError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Upstream { status, message } => {
                warn!("Chat provider returned {}: {}", status, message);
                RelayError::Upstream { status, message }
            }
            other => {
                error!("Relay failed: {}", other);
                RelayError::Server
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.to_string() };
        (self.status(), Json(body)).into_response()
    }
}

#[async_trait]
pub trait ChatRelay: Send + Sync {
    /// Forwards `message` verbatim and returns the provider's reply text.
    async fn relay(&self, message: Option<&str>) -> Result<String, RelayError>;
}

#[derive(Clone)]
pub struct Relay {
    chat_client: Option<Arc<dyn ChatClient>>,
}

impl Relay {
    pub fn new(chat_client: Option<Arc<dyn ChatClient>>) -> Self {
        if chat_client.is_none() {
            warn!("No chat provider API key configured; /api/chat will answer 500.");
        }
        Self { chat_client }
    }
}

#[async_trait]
impl ChatRelay for Relay {
    async fn relay(&self, message: Option<&str>) -> Result<String, RelayError> {
        let message = match message {
            Some(m) if !m.is_empty() => m,
            _ => {
                return Err(RelayError::InvalidRequest);
            }
        };

        let client = self.chat_client.as_ref().ok_or(RelayError::Configuration)?;

        info!("Relaying prompt ({} bytes) to model {}", message.len(), client.get_model());
        let completion = client.complete(message).await?;

        Ok(completion.response.unwrap_or_else(|| NO_RESPONSE_FALLBACK.to_string()))
    }
}
