//! Per-session chat state machine.
//!
//! A [`ChatView`] owns the in-memory conversation for one browser session.
//! It talks to its collaborators only through the injected [`ChatDeps`].

use log::{ info, warn };
use std::sync::Arc;

use crate::history::{ ConversationStore, StoreError };
use crate::models::chat::{ ChatMessage, Conversation };
use crate::relay::ChatRelay;
use crate::supabase::auth::{ AuthProvider, Session };

pub const SAVED_NOTICE: &str = "Chat saved!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    Signup,
    Chat,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Chat => "/chat",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    LoadingSession,
    Redirect(Route),
    Idle,
    Sending,
    ErrorShown(String),
}

#[derive(Clone)]
pub struct ChatDeps {
    pub auth: Arc<dyn AuthProvider>,
    pub store: Arc<dyn ConversationStore>,
    pub relay: Arc<dyn ChatRelay>,
}

pub struct ChatView {
    deps: ChatDeps,
    access_token: Option<String>,
    state: ViewState,
    messages: Conversation,
    input: String,
    notice: Option<String>,
}

impl ChatView {
    pub fn new(deps: ChatDeps, access_token: Option<String>) -> Self {
        Self {
            deps,
            access_token,
            state: ViewState::LoadingSession,
            messages: Vec::new(),
            input: String::new(),
            notice: None,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ViewState::ErrorShown(message) => Some(message),
            _ => None,
        }
    }

    pub fn redirect(&self) -> Option<Route> {
        match self.state {
            ViewState::Redirect(route) => Some(route),
            _ => None,
        }
    }

    /// Resolves the signed-in identity, if the token still names one.
    async fn current_owner(&self) -> Option<Session> {
        let token = self.access_token.as_deref()?;
        match self.deps.auth.get_user(token).await {
            Ok(user) =>
                Some(Session {
                    access_token: token.to_string(),
                    user,
                }),
            Err(e) => {
                warn!("No authenticated user for chat session: {}", e);
                None
            }
        }
    }

    pub async fn mount(&mut self) {
        self.state = ViewState::LoadingSession;
        self.messages.clear();
        self.notice = None;

        let Some(owner) = self.current_owner().await else {
            self.state = ViewState::Redirect(Route::Login);
            return;
        };

        match self.deps.store.fetch(&owner).await {
            Ok(messages) => {
                info!("Loaded {} turns for user {}", messages.len(), owner.user.id);
                self.messages = messages;
                self.state = ViewState::Idle;
            }
            Err(StoreError::NoRows) => {
                self.state = ViewState::Idle;
            }
            Err(e) => {
                self.state = ViewState::ErrorShown(format!("Failed to load chat: {}", e));
            }
        }
    }

    /// Sends the current input. Whitespace-only input is ignored.
    pub async fn send(&mut self) {
        if self.redirect().is_some() || self.input.trim().is_empty() {
            return;
        }
        self.state = ViewState::Sending;
        self.notice = None;

        let prompt = std::mem::take(&mut self.input);
        self.messages.push(ChatMessage::user(prompt.clone()));

        match self.deps.relay.relay(Some(prompt.as_str())).await {
            Ok(reply) => {
                self.messages.push(ChatMessage::assistant(reply));
                self.state = ViewState::Idle;
                self.persist().await;
            }
            Err(e) => {
                self.state = ViewState::ErrorShown(e.to_string());
            }
        }
    }

    pub async fn reset(&mut self) {
        if self.redirect().is_some() {
            return;
        }
        self.messages.clear();
        self.notice = None;
        self.state = ViewState::Idle;

        let Some(owner) = self.current_owner().await else {
            return;
        };
        if let Err(e) = self.deps.store.delete(&owner).await {
            self.state = ViewState::ErrorShown(format!("Failed to reset chat: {}", e));
        }
    }

    pub async fn save(&mut self) {
        if self.redirect().is_some() {
            return;
        }
        self.notice = None;
        self.state = ViewState::Idle;

        if self.persist().await {
            self.notice = Some(SAVED_NOTICE.to_string());
        }
    }

    pub async fn logout(&mut self) {
        if let Some(token) = self.access_token.take() {
            if let Err(e) = self.deps.auth.sign_out(&token).await {
                warn!("Sign-out failed, dropping session anyway: {}", e);
            }
        }
        self.messages.clear();
        self.notice = None;
        self.state = ViewState::Redirect(Route::Login);
    }

    /// Writes the full local conversation. Returns false only on a store failure.
    async fn persist(&mut self) -> bool {
        let Some(owner) = self.current_owner().await else {
            return true;
        };
        match self.deps.store.upsert(&owner, &self.messages).await {
            Ok(()) => true,
            Err(e) => {
                self.state = ViewState::ErrorShown(format!("Failed to save chat: {}", e));
                false
            }
        }
    }
}
