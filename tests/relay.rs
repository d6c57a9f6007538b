mod common;

use std::sync::Arc;

use axum::body::{ to_bytes, Body };
use axum::http::{ Request, StatusCode };
use serde_json::{ json, Value };
use tower::ServiceExt;

use common::{ FakeAuth, FakeChatClient, Script };
use study_chat::history::MemoryHistoryStore;
use study_chat::llm::chat::ChatClient;
use study_chat::relay::Relay;
use study_chat::server::api::{ build_router, AppState };

fn app(client: Option<Arc<dyn ChatClient>>) -> axum::Router {
    let state = AppState::new(
        Arc::new(Relay::new(client)),
        Arc::new(FakeAuth::default()),
        Arc::new(MemoryHistoryStore::new()),
        "http://localhost:3000/chat".to_string()
    );
    build_router(state)
}

async fn post_chat(app: axum::Router, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn forwards_message_verbatim_and_returns_reply() {
    let client = FakeChatClient::new(Script::Reply(Some("Big-O describes growth rate.".into())));
    let prompts = [
        "What is Big-O?",
        "  leading and trailing spaces  ",
        "multi\nline\n\n**markdown** <b>tags</b>",
        "ünïcödé ✓",
    ];

    for prompt in prompts {
        let body = json!({ "message": prompt }).to_string();
        let (status, reply) = post_chat(app(Some(client.clone())), &body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply, json!({ "reply": "Big-O describes growth rate." }));
    }

    assert_eq!(client.calls(), prompts);
}

#[tokio::test]
async fn missing_or_empty_message_is_rejected_without_upstream_call() {
    let client = FakeChatClient::new(Script::Reply(Some("unused".into())));

    for body in [r#"{}"#, r#"{"message":""}"#, r#"{"message":null}"#] {
        let (status, reply) = post_chat(app(Some(client.clone())), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(reply, json!({ "error": "Message is required" }));
    }

    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn missing_api_key_is_a_configuration_error() {
    let (status, reply) = post_chat(app(None), r#"{"message":"hi"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply, json!({ "error": "API key not configured" }));
}

#[tokio::test]
async fn message_check_runs_before_key_check() {
    let (status, _) = post_chat(app(None), r#"{}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upstream_failure_passes_status_and_message_through() {
    let client = FakeChatClient::new(Script::Upstream(403, "API key not valid".into()));
    let (status, reply) = post_chat(app(Some(client)), r#"{"message":"hi"}"#).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(reply, json!({ "error": "API key not valid" }));
}

#[tokio::test]
async fn empty_completion_uses_fallback_reply() {
    let client = FakeChatClient::new(Script::Reply(None));
    let (status, reply) = post_chat(app(Some(client)), r#"{"message":"hi"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply, json!({ "reply": "No response from AI" }));
}

#[tokio::test]
async fn internal_failures_do_not_leak_detail() {
    let client = FakeChatClient::new(Script::Broken);
    let (status, reply) = post_chat(app(Some(client)), r#"{"message":"hi"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply, json!({ "error": "Server error" }));

    let (status, reply) = post_chat(app(None), "not json").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply, json!({ "error": "Server error" }));
}
