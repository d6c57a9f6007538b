use axum::http::{ header, HeaderMap };
use chrono::{ DateTime, Duration, Utc };
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;
use log::debug;

use crate::chat::ChatView;

pub const SESSION_COOKIE: &str = "sid";
pub const DEFAULT_IDLE_TIMEOUT_HOURS: i64 = 12;

struct WebSession {
    access_token: String,
    chat: Option<Arc<Mutex<ChatView>>>,
    last_seen: DateTime<Utc>,
}

/// Maps the opaque `sid` cookie to the auth token and the live chat view.
///
/// Each view sits behind its own lock, so a slow relay call only holds up
/// requests for that one session. Sessions untouched for longer than the
/// idle timeout are pruned whenever a new one is opened.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<Mutex<HashMap<String, WebSession>>>,
    idle_timeout: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_idle_timeout(Duration::hours(DEFAULT_IDLE_TIMEOUT_HOURS))
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            idle_timeout,
        }
    }

    pub async fn open(&self, access_token: String) -> String {
        let now = Utc::now();
        let sid = Uuid::new_v4().to_string();

        let mut sessions = self.inner.lock().await;
        self.prune(&mut sessions, now);
        sessions.insert(sid.clone(), WebSession {
            access_token,
            chat: None,
            last_seen: now,
        });
        sid
    }

    /// Drops every session idle since before `now - idle_timeout`.
    pub async fn prune_idle(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.inner.lock().await;
        self.prune(&mut sessions, now)
    }

    fn prune(&self, sessions: &mut HashMap<String, WebSession>, now: DateTime<Utc>) -> usize {
        let before = sessions.len();
        sessions.retain(|_, s| now - s.last_seen <= self.idle_timeout);
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!("Pruned {} idle sessions", pruned);
        }
        pruned
    }

    pub async fn count(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn access_token(&self, sid: &str) -> Option<String> {
        self.inner
            .lock().await
            .get_mut(sid)
            .map(|s| {
                s.last_seen = Utc::now();
                s.access_token.clone()
            })
    }

    pub async fn view(&self, sid: &str) -> Option<Arc<Mutex<ChatView>>> {
        self.inner
            .lock().await
            .get_mut(sid)
            .and_then(|s| {
                s.last_seen = Utc::now();
                s.chat.clone()
            })
    }

    pub async fn attach_view(&self, sid: &str, view: Arc<Mutex<ChatView>>) {
        if let Some(session) = self.inner.lock().await.get_mut(sid) {
            session.chat = Some(view);
        }
    }

    /// Forgets the session and hands back its token for sign-out.
    pub async fn close(&self, sid: &str) -> Option<String> {
        self.inner
            .lock().await
            .remove(sid)
            .map(|s| s.access_token)
    }
}

pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|v| !v.is_empty())
}

pub fn session_cookie(sid: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, sid)
}

pub fn cleared_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
