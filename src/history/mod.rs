mod memory;
mod postgrest;

pub use memory::MemoryHistoryStore;
pub use postgrest::SupabaseHistoryStore;

use async_trait::async_trait;
use log::info;
use std::error::Error;
use std::sync::Arc;

use crate::cli::Args;
use crate::models::chat::{ ChatMessage, Conversation };
use crate::supabase::auth::Session;
use crate::supabase::SupabaseClient;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The owner has never saved a conversation.
    #[error("No rows found")]
    NoRows,

    #[error("{message}")]
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Storage service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid stored conversation: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid storage url: {0}")]
    Url(#[from] url::ParseError),
}

/// One conversation row per user. Writes always replace the whole list.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn fetch(&self, owner: &Session) -> Result<Conversation, StoreError>;

    async fn upsert(&self, owner: &Session, messages: &[ChatMessage]) -> Result<(), StoreError>;

    async fn delete(&self, owner: &Session) -> Result<(), StoreError>;
}

pub fn create_history_store(
    args: &Args,
    client: &SupabaseClient
) -> Result<Arc<dyn ConversationStore>, Box<dyn Error + Send + Sync>> {
    match args.history_type.to_lowercase().as_str() {
        "supabase" => Ok(Arc::new(SupabaseHistoryStore::new(client.clone()))),
        "memory" => Ok(Arc::new(MemoryHistoryStore::new())),
        _ =>
            Err(
                Box::new(
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("Unsupported history store type: {}", args.history_type)
                    )
                )
            ),
    }
}

pub fn initialize_history_store(
    args: &Args,
    client: &SupabaseClient
) -> Result<Arc<dyn ConversationStore>, Box<dyn Error + Send + Sync>> {
    info!("Chat history will be stored in: {} at {}", args.history_type, client.base_url());
    create_history_store(args, client)
}
