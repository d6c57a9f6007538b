pub mod chat;
pub mod cli;
pub mod history;
pub mod llm;
pub mod models;
pub mod relay;
pub mod server;
pub mod supabase;

use cli::Args;
use history::initialize_history_store;
use llm::chat::new_client as new_chat_client;
use log::{ info, warn };
use relay::Relay;
use server::api::AppState;
use server::Server;
use supabase::auth::SupabaseAuth;
use supabase::SupabaseClient;
use std::error::Error;
use std::sync::Arc;

fn presence(secret: &str) -> &'static str {
    if secret.trim().is_empty() { "not set" } else { "set" }
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Gemini Base URL: {}", args.gemini_base_url);
    info!("Gemini Model: {}", args.gemini_model);
    info!("Gemini API Key: {}", presence(&args.gemini_api_key));
    info!("Supabase URL: {}", args.supabase_url);
    info!("Supabase Anon Key: {}", presence(&args.supabase_anon_key));
    info!("History Store Type: {}", args.history_type);
    info!("Signup Redirect URL: {}", args.signup_redirect_url);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let supabase = SupabaseClient::new(&args.supabase_url, args.supabase_anon_key.clone())
        .map_err(|e| format!("Invalid SUPABASE_URL '{}': {}", args.supabase_url, e))?;
    if args.supabase_anon_key.trim().is_empty() {
        warn!("SUPABASE_ANON_KEY is empty; auth and storage requests will be rejected.");
    }

    let relay = Arc::new(Relay::new(new_chat_client(&args.llm_config())));
    let auth = Arc::new(SupabaseAuth::new(supabase.clone()));
    let store = initialize_history_store(&args, &supabase)?;

    let state = AppState::new(relay, auth, store, args.signup_redirect_url.clone());
    let server = Server::new(args.server_addr.clone(), state, args.clone());
    server.run().await?;

    Ok(())
}
