use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use super::*;
use crate::llm::config::{LlmTimeouts, ProviderEndpoints};
use crate::llm::types::ProviderKind;

// =========================================================================
// Mock provider
// =========================================================================

#[derive(Clone, Default)]
struct Seen {
    requests: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}

impl Seen {
    fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

async fn messages(State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    seen.requests.lock().unwrap().push((headers, body));
    Json(json!({
        "id": "msg_1",
        "type": "message",
        "content": [{ "type": "text", "text": "Hello blog" }],
        "stop_reason": "end_turn"
    }))
}

async fn completions(State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    let model = body["model"].as_str().unwrap_or_default().to_string();
    seen.requests.lock().unwrap().push((headers, body));
    Json(json!({ "choices": [{ "message": { "role": "assistant", "content": format!("answer from {model}") } }] }))
}

async fn missing_model(State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    seen.requests.lock().unwrap().push((headers, body));
    (StatusCode::NOT_FOUND, Json(json!({ "error": "model \"llama9\" not found" })))
}

async fn spawn_provider() -> (String, Seen) {
    let seen = Seen::default();
    let app = Router::new()
        .route("/v1/messages", post(messages))
        .route("/v1/chat/completions", post(completions))
        .route("/broken/v1/chat/completions", post(missing_model))
        .with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), seen)
}

fn agent_for(base: &str) -> BlogAgent {
    let config = LlmConfig {
        endpoints: ProviderEndpoints {
            anthropic: format!("{base}/v1/messages"),
            openai: format!("{base}/v1/chat/completions"),
            perplexity: format!("{base}/v1/chat/completions"),
        },
        timeouts: LlmTimeouts { request_secs: 5, connect_secs: 2 },
    };
    BlogAgent::from_config(config).unwrap()
}

// =========================================================================
// generate_blog_post
// =========================================================================

#[tokio::test]
async fn claude_key_routes_to_messages_api() {
    let (base, seen) = spawn_provider().await;
    let agent = agent_for(&base);

    let post = agent
        .generate_blog_post("sk-ant-test", &GenerationRequest::new("A paper about attention."))
        .await
        .unwrap();
    assert_eq!(post, "Hello blog");

    let requests = seen.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (headers, body) = &requests[0];
    assert_eq!(headers["x-api-key"], "sk-ant-test");
    assert_eq!(headers["anthropic-version"], "2023-06-01");
    assert_eq!(body["model"], "claude-sonnet-4-20250514");
    assert_eq!(body["max_tokens"], 4000);
    let content = body["messages"][0]["content"].as_str().unwrap();
    assert!(content.contains("A paper about attention."));
}

#[tokio::test]
async fn unknown_key_fails_before_any_network_call() {
    let (base, seen) = spawn_provider().await;
    let agent = agent_for(&base);

    let err = agent
        .generate_blog_post("bogus-key", &GenerationRequest::new("text"))
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::UnknownCredential));
    assert!(err.to_string().starts_with("unknown API key format"));
    assert_eq!(seen.count(), 0);
}

#[tokio::test]
async fn blank_key_is_missing_key() {
    let (base, seen) = spawn_provider().await;
    let err = agent_for(&base)
        .generate_blog_post("   ", &GenerationRequest::new("text"))
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey));
    assert_eq!(seen.count(), 0);
}

#[tokio::test]
async fn openai_key_sends_bearer_and_temperature() {
    let (base, seen) = spawn_provider().await;
    let mut request = GenerationRequest::new("text");
    request.temperature = 0.3;

    let post = agent_for(&base).generate_blog_post("sk-proj-abc", &request).await.unwrap();
    assert_eq!(post, "answer from gpt-4o");

    let requests = seen.requests.lock().unwrap();
    let (headers, body) = &requests[0];
    assert_eq!(headers["authorization"], "Bearer sk-proj-abc");
    assert!((body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-9);
    assert_eq!(body["messages"][0]["role"], "system");
}

#[tokio::test]
async fn local_endpoint_uses_model_suffix_without_auth() {
    let (base, seen) = spawn_provider().await;
    let post = agent_for("http://unused.invalid")
        .generate_blog_post(&format!("{base}|mistral"), &GenerationRequest::new("text"))
        .await
        .unwrap();
    assert_eq!(post, "answer from mistral");

    let requests = seen.requests.lock().unwrap();
    assert!(requests[0].0.get("authorization").is_none());
}

#[tokio::test]
async fn local_error_envelope_surfaces_with_context() {
    let (base, _seen) = spawn_provider().await;
    let err = agent_for(&base)
        .generate_blog_post(&format!("{base}/broken|llama9"), &GenerationRequest::new("text"))
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::Provider { provider: ProviderKind::Local, .. }));
    assert_eq!(err.to_string(), "local model error: model \"llama9\" not found");
}

// =========================================================================
// answer_question
// =========================================================================

#[tokio::test]
async fn question_routes_through_same_table() {
    let (base, seen) = spawn_provider().await;
    let request = QuestionRequest {
        pdf_content: "The model has 12 layers.".into(),
        question: "How many layers?".into(),
        temperature: 0.7,
    };
    let answer = agent_for(&base).answer_question("pplx-abc", &request).await.unwrap();
    assert_eq!(answer, "answer from sonar-pro");

    let requests = seen.requests.lock().unwrap();
    let user = requests[0].1["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains("Question: How many layers?"));
}

#[tokio::test]
async fn question_with_unknown_key_is_rejected() {
    let (base, seen) = spawn_provider().await;
    let request = QuestionRequest { pdf_content: "x".into(), question: "y".into(), temperature: 0.7 };
    let err = agent_for(&base).answer_question("nope", &request).await.unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(seen.count(), 0);
}
