#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{ Arc, Mutex };

use study_chat::chat::ChatDeps;
use study_chat::history::{ ConversationStore, MemoryHistoryStore, StoreError };
use study_chat::llm::chat::{ ChatClient, CompletionResponse, LlmError };
use study_chat::models::chat::{ ChatMessage, Conversation };
use study_chat::relay::{ ChatRelay, RelayError };
use study_chat::supabase::auth::{ AuthError, AuthProvider, Credentials, Session, User };

pub const TOKEN: &str = "token-alice";
pub const EMAIL: &str = "alice@example.com";
pub const PASSWORD: &str = "correct horse";

pub fn alice() -> User {
    User {
        id: "user-alice".to_string(),
        email: Some(EMAIL.to_string()),
    }
}

pub fn alice_session() -> Session {
    Session {
        access_token: TOKEN.to_string(),
        user: alice(),
    }
}

/// Accepts one account and one token.
#[derive(Default)]
pub struct FakeAuth {
    pub signed_out: Mutex<Vec<String>>,
    pub confirm_on_signup: bool,
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn get_user(&self, access_token: &str) -> Result<User, AuthError> {
        if access_token == TOKEN {
            Ok(alice())
        } else {
            Err(AuthError::Rejected {
                status: 401,
                message: "invalid JWT".to_string(),
            })
        }
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        if credentials.email == EMAIL && credentials.password == PASSWORD {
            Ok(alice_session())
        } else {
            Err(AuthError::Rejected {
                status: 400,
                message: "Invalid login credentials".to_string(),
            })
        }
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
        _email_redirect_to: &str
    ) -> Result<Option<Session>, AuthError> {
        if credentials.password.len() < 6 {
            return Err(AuthError::Rejected {
                status: 422,
                message: "Password should be at least 6 characters.".to_string(),
            });
        }
        Ok(self.confirm_on_signup.then(alice_session))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.signed_out.lock().unwrap().push(access_token.to_string());
        Ok(())
    }
}

/// Chat provider that answers from a script and records every prompt.
pub enum Script {
    Reply(Option<String>),
    Upstream(u16, String),
    Broken,
}

pub struct FakeChatClient {
    script: Script,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeChatClient {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for FakeChatClient {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.script {
            Script::Reply(text) => Ok(CompletionResponse { response: text.clone() }),
            Script::Upstream(status, message) =>
                Err(LlmError::Upstream {
                    status: *status,
                    message: message.clone(),
                }),
            Script::Broken => {
                let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
                Err(LlmError::Decode(err))
            }
        }
    }

    fn get_model(&self) -> String {
        "fake-model".to_string()
    }
}

/// Relay stand-in for view tests.
pub struct FakeRelay {
    pub outcome: Result<String, RelayError>,
    pub messages: Mutex<Vec<String>>,
}

impl FakeRelay {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(text.to_string()),
            messages: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(err: RelayError) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(err),
            messages: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ChatRelay for FakeRelay {
    async fn relay(&self, message: Option<&str>) -> Result<String, RelayError> {
        self.messages.lock().unwrap().push(message.unwrap_or_default().to_string());
        self.outcome.clone()
    }
}

/// Store whose every call fails with a backend rejection.
pub struct BrokenStore;

#[async_trait]
impl ConversationStore for BrokenStore {
    async fn fetch(&self, _owner: &Session) -> Result<Conversation, StoreError> {
        Err(rejected())
    }

    async fn upsert(&self, _owner: &Session, _messages: &[ChatMessage]) -> Result<(), StoreError> {
        Err(rejected())
    }

    async fn delete(&self, _owner: &Session) -> Result<(), StoreError> {
        Err(rejected())
    }
}

fn rejected() -> StoreError {
    StoreError::Rejected {
        status: 503,
        code: None,
        message: "database unavailable".to_string(),
    }
}

pub struct Harness {
    pub auth: Arc<FakeAuth>,
    pub store: Arc<MemoryHistoryStore>,
    pub relay: Arc<FakeRelay>,
}

impl Harness {
    pub fn new(relay: Arc<FakeRelay>) -> Self {
        Self {
            auth: Arc::new(FakeAuth::default()),
            store: Arc::new(MemoryHistoryStore::new()),
            relay,
        }
    }

    pub fn deps(&self) -> ChatDeps {
        ChatDeps {
            auth: self.auth.clone(),
            store: self.store.clone(),
            relay: self.relay.clone(),
        }
    }
}
