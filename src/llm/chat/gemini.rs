use async_trait::async_trait;
use serde::{ Deserialize, Serialize };
use serde_json::Value as JsonValue;
use url::Url;
use log::info;

use super::{ ChatClient, CompletionResponse, LlmError };
use crate::llm::{ LlmConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL };

const FALLBACK_ERROR_MESSAGE: &str = "API error";

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    candidates: Option<Vec<GoogleCandidate>>,
}

#[derive(Deserialize)]
struct GoogleCandidate {
    #[serde(default)]
    content: Option<GoogleContent>,
}

#[derive(Deserialize)]
struct GoogleContent {
    #[serde(default)]
    parts: Option<Vec<GooglePart>>,
}

#[derive(Deserialize)]
struct GooglePart {
    #[serde(default)]
    text: Option<String>,
}

fn single_turn_request(prompt: &str) -> GeminiRequest {
    GeminiRequest {
        contents: vec![GeminiContent {
            parts: vec![GeminiPart {
                text: prompt.to_string(),
            }],
        }],
    }
}

fn first_candidate_text(resp: GoogleResponse) -> Option<String> {
    resp.candidates?
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|content| content.parts?.into_iter().next())
        .and_then(|p| p.text)
        .filter(|t| !t.is_empty())
}

/// Pulls `error.message` out of a provider error payload.
fn upstream_error_message(body: &JsonValue) -> String {
    body.pointer("/error/message")
        .and_then(JsonValue::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(FALLBACK_ERROR_MESSAGE)
        .to_string()
}

pub struct GeminiChatClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiChatClient {
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        let model = model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        let base_url = base_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());

        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            base_url,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Option<Self> {
        let api_key = config.configured_api_key()?.to_string();
        Some(Self::new(api_key, config.completion_model.clone(), config.base_url.clone()))
    }

    fn endpoint(&self) -> Result<Url, url::ParseError> {
        let raw = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let mut url = Url::parse(&raw)?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, LlmError> {
        info!(
            "GeminiChatClient::complete() → model={} base_url={} prompt_len={}",
            self.model,
            self.base_url,
            prompt.len()
        );

        let resp = self.http
            .post(self.endpoint()?)
            .json(&single_turn_request(prompt))
            .send().await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        let body: JsonValue = serde_json::from_slice(&bytes)?;

        if !status.is_success() {
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                message: upstream_error_message(&body),
            });
        }

        let parsed: GoogleResponse = serde_json::from_value(body)?;
        Ok(CompletionResponse {
            response: first_candidate_text(parsed),
        })
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }
}
