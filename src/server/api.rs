use crate::chat::{ ChatDeps, Route };
use crate::cli::Args;
use crate::history::ConversationStore;
use crate::models::relay::{ ChatReply, ChatRequest };
use crate::relay::{ ChatRelay, RelayError };
use crate::supabase::auth::AuthProvider;
use super::session::SessionRegistry;
use super::views;

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    body::Bytes,
    routing::{ get, post },
    Router,
    extract::State,
    Json,
};
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, warn };

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<dyn ChatRelay>,
    pub auth: Arc<dyn AuthProvider>,
    pub store: Arc<dyn ConversationStore>,
    pub sessions: SessionRegistry,
    pub signup_redirect_url: String,
}

impl AppState {
    pub fn new(
        relay: Arc<dyn ChatRelay>,
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn ConversationStore>,
        signup_redirect_url: String,
    ) -> Self {
        Self {
            relay,
            auth,
            store,
            sessions: SessionRegistry::new(),
            signup_redirect_url,
        }
    }

    pub fn chat_deps(&self) -> ChatDeps {
        ChatDeps {
            auth: self.auth.clone(),
            store: self.store.clone(),
            relay: self.relay.clone(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(Route::Landing.path(), get(views::landing))
        .route(Route::Login.path(), get(views::login_form).post(views::login))
        .route(Route::Signup.path(), get(views::signup_form).post(views::signup))
        .route(Route::Chat.path(), get(views::chat))
        .route("/chat/send", post(views::send))
        .route("/chat/reset", post(views::reset))
        .route("/chat/save", post(views::save))
        .route("/logout", post(views::logout))
        .route("/api/chat", post(chat_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_http_server(
    addr: &str,
    state: AppState,
    args: &Args,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;
    let app = build_router(state);

    if args.enable_tls {
        let (cert_path, key_path) = match (&args.tls_cert_path, &args.tls_key_path) {
            (Some(cert), Some(key)) => (cert, key),
            _ => {
                return Err("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.".into());
            }
        };
        info!("TLS enabled. Loading certificate from '{}' and key from '{}'", cert_path, key_path);

        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
            cert_path,
            key_path
        ).await?;

        info!("Starting HTTPS server on: https://{}", addr);
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await?;
    } else {
        info!("Starting HTTP server on: http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app.into_make_service()).await?;
    }

    Ok(())
}

/// `POST /api/chat`. The body is parsed by hand so that malformed JSON
/// reports the generic server error instead of an extractor rejection.
async fn chat_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatReply>, RelayError> {
    let req: ChatRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!("Unreadable /api/chat body: {}", e);
        RelayError::Server
    })?;

    let reply = state.relay.relay(req.message.as_deref()).await?;
    Ok(Json(ChatReply { reply }))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "study-chat",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
