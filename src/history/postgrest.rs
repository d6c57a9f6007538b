use async_trait::async_trait;
use chrono::Utc;
use log::warn;
use reqwest::Method;
use serde::{ Deserialize, Serialize };
use url::Url;

use super::{ ConversationStore, StoreError };
use crate::models::chat::{ ChatMessage, Conversation };
use crate::supabase::auth::Session;
use crate::supabase::{ error_message, SupabaseClient };

const CHATS_TABLE: &str = "rest/v1/chats";
const NO_ROWS_CODE: &str = "PGRST116";
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

#[derive(Serialize)]
struct ChatRow<'a> {
    user_id: &'a str,
    messages: &'a [ChatMessage],
    updated_at: String,
}

#[derive(Deserialize)]
struct MessagesColumn {
    #[serde(default)]
    messages: Option<Conversation>,
}

#[derive(Deserialize, Default)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
}

fn owner_filter(owner: &Session) -> String {
    format!("eq.{}", owner.user.id)
}

/// Maps a failed PostgREST response onto [`StoreError`].
fn rejection(status: reqwest::StatusCode, body: &str) -> StoreError {
    let code = serde_json::from_str::<PostgrestError>(body).unwrap_or_default().code;
    if code.as_deref() == Some(NO_ROWS_CODE) {
        return StoreError::NoRows;
    }
    StoreError::Rejected {
        status: status.as_u16(),
        code,
        message: error_message(body, status),
    }
}

/// Conversation rows in the hosted `chats` table, accessed through PostgREST
/// with the owner's token so row-level security applies.
pub struct SupabaseHistoryStore {
    client: SupabaseClient,
}

impl SupabaseHistoryStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    fn table(&self) -> Result<Url, StoreError> {
        Ok(self.client.endpoint(CHATS_TABLE)?)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let err = rejection(status, &body);
        if !matches!(err, StoreError::NoRows) {
            warn!("Storage request rejected ({}): {}", status, err);
        }
        Err(err)
    }
}

#[async_trait]
impl ConversationStore for SupabaseHistoryStore {
    async fn fetch(&self, owner: &Session) -> Result<Conversation, StoreError> {
        let mut url = self.table()?;
        url.query_pairs_mut()
            .append_pair("select", "messages")
            .append_pair("user_id", &owner_filter(owner));

        let resp = self.client
            .request(Method::GET, url, Some(&owner.access_token))
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT)
            .send().await?;
        let resp = Self::check(resp).await?;

        let bytes = resp.bytes().await?;
        let row: MessagesColumn = serde_json::from_slice(&bytes)?;
        Ok(row.messages.unwrap_or_default())
    }

    async fn upsert(&self, owner: &Session, messages: &[ChatMessage]) -> Result<(), StoreError> {
        let mut url = self.table()?;
        url.query_pairs_mut().append_pair("on_conflict", "user_id");

        let row = ChatRow {
            user_id: &owner.user.id,
            messages,
            updated_at: Utc::now().to_rfc3339(),
        };

        let resp = self.client
            .request(Method::POST, url, Some(&owner.access_token))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&row)
            .send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn delete(&self, owner: &Session) -> Result<(), StoreError> {
        let mut url = self.table()?;
        url.query_pairs_mut().append_pair("user_id", &owner_filter(owner));

        let resp = self.client
            .request(Method::DELETE, url, Some(&owner.access_token))
            .header("Prefer", "return=minimal")
            .send().await?;
        Self::check(resp).await?;
        Ok(())
    }
}
