//! Explicitly constructed client for the hosted auth + data backend.
//!
//! Built once at startup from the public URL and anon key, then cloned into
//! every component that needs it. Cloning shares the underlying connection pool.

pub mod auth;

use reqwest::{ Method, RequestBuilder };
use serde_json::Value as JsonValue;
use url::Url;

#[derive(Clone, Debug)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: Url,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(project_url: &str, anon_key: impl Into<String>) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(&format!("{}/", project_url.trim_end_matches('/')))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            anon_key: anon_key.into(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a path such as `auth/v1/user` against the project URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path.trim_start_matches('/'))
    }

    /// Starts a request carrying the `apikey` header, plus a bearer token when given.
    pub fn request(&self, method: Method, url: Url, bearer: Option<&str>) -> RequestBuilder {
        let token = bearer.unwrap_or(&self.anon_key);
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }
}

/// Best human-readable message from a backend error body.
pub(crate) fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(json) = serde_json::from_str::<JsonValue>(body) {
        for key in ["msg", "message", "error_description", "error"] {
            if let Some(text) = json.get(key).and_then(JsonValue::as_str) {
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }
    }
    if !body.trim().is_empty() {
        return body.trim().to_string();
    }
    status.canonical_reason().unwrap_or("Request failed").to_string()
}
