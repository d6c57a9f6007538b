use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{ ConversationStore, StoreError };
use crate::models::chat::{ ChatMessage, Conversation };
use crate::supabase::auth::Session;

/// Process-local store keyed by user id. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryHistoryStore {
    rows: RwLock<HashMap<String, Conversation>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for MemoryHistoryStore {
    async fn fetch(&self, owner: &Session) -> Result<Conversation, StoreError> {
        self.rows.read().await.get(&owner.user.id).cloned().ok_or(StoreError::NoRows)
    }

    async fn upsert(&self, owner: &Session, messages: &[ChatMessage]) -> Result<(), StoreError> {
        self.rows.write().await.insert(owner.user.id.clone(), messages.to_vec());
        Ok(())
    }

    async fn delete(&self, owner: &Session) -> Result<(), StoreError> {
        self.rows.write().await.remove(&owner.user.id);
        Ok(())
    }
}
