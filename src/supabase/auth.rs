use async_trait::async_trait;
use log::warn;
use reqwest::Method;
use serde::{ Deserialize, Serialize };
use std::fmt;
use thiserror::Error;

use super::{ error_message, SupabaseClient };

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// An authenticated identity plus the bearer token that proves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

/// Email and password, forwarded as-is to the auth backend and never stored.
#[derive(Clone, Deserialize, Serialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{message}")]
    Rejected {
        status: u16,
        message: String,
    },

    #[error("Auth service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid auth service url: {0}")]
    Url(#[from] url::ParseError),
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn get_user(&self, access_token: &str) -> Result<User, AuthError>;

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<Session, AuthError>;

    /// Returns a session only when the backend confirms the account immediately.
    async fn sign_up(
        &self,
        credentials: &Credentials,
        email_redirect_to: &str
    ) -> Result<Option<Session>, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<User>,
}

impl TokenResponse {
    fn into_session(self) -> Option<Session> {
        match (self.access_token, self.user) {
            (Some(access_token), Some(user)) => Some(Session { access_token, user }),
            _ => None,
        }
    }
}

/// GoTrue-backed implementation.
pub struct SupabaseAuth {
    client: SupabaseClient,
}

impl SupabaseAuth {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, AuthError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = error_message(&body, status);
        warn!("Auth request rejected ({}): {}", status, message);
        Err(AuthError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    async fn get_user(&self, access_token: &str) -> Result<User, AuthError> {
        let url = self.client.endpoint("auth/v1/user")?;
        let resp = self.client.request(Method::GET, url, Some(access_token)).send().await?;
        let resp = Self::check(resp).await?;
        Ok(resp.json::<User>().await?)
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let mut url = self.client.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let resp = self.client.request(Method::POST, url, None).json(credentials).send().await?;
        let resp = Self::check(resp).await?;
        let status = resp.status().as_u16();

        resp.json::<TokenResponse>()
            .await?
            .into_session()
            .ok_or_else(|| AuthError::Rejected {
                status,
                message: "Auth service returned no session".to_string(),
            })
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
        email_redirect_to: &str
    ) -> Result<Option<Session>, AuthError> {
        let mut url = self.client.endpoint("auth/v1/signup")?;
        url.query_pairs_mut().append_pair("redirect_to", email_redirect_to);

        let resp = self.client.request(Method::POST, url, None).json(credentials).send().await?;
        let resp = Self::check(resp).await?;

        // Unconfirmed sign-ups answer with a bare user object.
        Ok(resp.json::<TokenResponse>().await?.into_session())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let url = self.client.endpoint("auth/v1/logout")?;
        let resp = self.client.request(Method::POST, url, Some(access_token)).send().await?;
        Self::check(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_redacted_in_debug() {
        let creds = Credentials {
            email: "a@b.c".into(),
            password: "hunter2".into(),
        };
        let printed = format!("{:?}", creds);
        assert!(printed.contains("a@b.c"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn bare_user_body_has_no_session() {
        let body: TokenResponse = serde_json
            ::from_str(r#"{"id":"u1","email":"a@b.c","confirmation_sent_at":"2024-01-01T00:00:00Z"}"#)
            .unwrap();
        assert!(body.into_session().is_none());
    }

    #[test]
    fn token_body_becomes_session() {
        let body: TokenResponse = serde_json
            ::from_str(
                r#"{"access_token":"jwt","token_type":"bearer","user":{"id":"u1","email":"a@b.c"}}"#
            )
            .unwrap();
        let session = body.into_session().unwrap();
        assert_eq!(session.access_token, "jwt");
        assert_eq!(session.user.id, "u1");
    }
}
