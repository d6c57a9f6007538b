use clap::Parser;

use crate::llm::{ LlmConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Chat LLM Provider Args ---
    /// Server-side API key for the Gemini API. Leave empty to run without a relay backend.
    #[arg(long, env = "GEMINI_API_KEY", default_value = "", hide_env_values = true)]
    pub gemini_api_key: String,

    /// Base URL of the Gemini REST API.
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_GEMINI_BASE_URL)]
    pub gemini_base_url: String,

    /// Model used for generateContent calls.
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub gemini_model: String,

    // --- Auth / Storage Backend Args ---
    /// Public project URL of the Supabase backend (e.g., https://xyz.supabase.co)
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: String,

    /// Public anon key of the Supabase backend.
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    pub supabase_anon_key: String,

    /// History chat store type (supabase, memory)
    #[arg(long, env = "HISTORY_TYPE", default_value = "supabase")]
    pub history_type: String,

    /// Where the confirmation email sends new users after sign-up.
    #[arg(long, env = "SIGNUP_REDIRECT_URL", default_value = "http://localhost:3000/chat")]
    pub signup_redirect_url: String,

    // --- General App Args ---
    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:3000")]
    pub server_addr: String,

    /// Optional path to the TLS certificate file (PEM format) for enabling HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for enabling HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

impl Args {
    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            api_key: Some(self.gemini_api_key.clone()).filter(|k| !k.trim().is_empty()),
            completion_model: Some(self.gemini_model.clone()),
            base_url: Some(self.gemini_base_url.clone()),
        }
    }
}
