//! OpenAiClient against a local chat completions stub.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use greenwash_scan::AnalysisError;
use greenwash_scan::config::{LlmConfig, PromptConfig};
use greenwash_scan::llm::{CompletionClient, OpenAiClient};
use greenwash_scan::prompt::build_prompt;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Recorded {
    hits: usize,
    last_body: Option<Value>,
    last_auth: Option<String>,
}

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    reply: Value,
    recorded: Arc<Mutex<Recorded>>,
}

async fn completions(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut recorded = stub.recorded.lock().unwrap();
    recorded.hits += 1;
    recorded.last_body = Some(body);
    recorded.last_auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    (stub.status, Json(stub.reply.clone()))
}

/// Starts the stub and returns its `/v1` base URL with the shared record
async fn spawn_stub(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Recorded>>) {
    let recorded = Arc::new(Mutex::new(Recorded::default()));
    let stub = Stub {
        status,
        reply,
        recorded: recorded.clone(),
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/v1", addr), recorded)
}

fn config(base_url: &str) -> LlmConfig {
    let mut config = LlmConfig {
        base_url: base_url.to_string(),
        ..LlmConfig::default()
    };
    config.retry.base_delay_ms = 10;
    config
}

fn prompt() -> greenwash_scan::prompt::AnalysisPrompt {
    build_prompt("Our packaging is fully recyclable.", &PromptConfig::default())
}

#[tokio::test]
async fn test_successful_completion() {
    let reply = json!({
        "id": "chatcmpl-1",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": "{\"score\": 12}"}}]
    });
    let (base, recorded) = spawn_stub(StatusCode::OK, reply).await;
    let client = OpenAiClient::new("sk-test", &config(&base)).unwrap();

    let text = client.complete(&prompt()).await.unwrap();

    assert_eq!(text, r#"{"score": 12}"#);
    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.hits, 1);
    assert_eq!(recorded.last_auth.as_deref(), Some("Bearer sk-test"));

    let body = recorded.last_body.as_ref().unwrap();
    assert_eq!(body["model"], "gpt-3.5-turbo");
    assert!((body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    assert_eq!(body["max_tokens"], 1000);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["role"], "user");
    assert!(
        body["messages"][1]["content"]
            .as_str()
            .unwrap()
            .contains("fully recyclable")
    );
}

#[tokio::test]
async fn test_rate_limit_gives_up_after_three_attempts() {
    let reply = json!({"error": {"message": "Rate limit reached"}});
    let (base, recorded) = spawn_stub(StatusCode::TOO_MANY_REQUESTS, reply).await;
    let client = OpenAiClient::new("sk-test", &config(&base)).unwrap();

    let result = client.complete(&prompt()).await;

    assert!(matches!(
        result,
        Err(AnalysisError::RateLimitExceeded { attempts: 3 })
    ));
    assert_eq!(recorded.lock().unwrap().hits, 3);
}

#[tokio::test]
async fn test_other_failures_are_not_retried() {
    for status in [StatusCode::INTERNAL_SERVER_ERROR, StatusCode::BAD_REQUEST] {
        let reply = json!({"error": {"message": "nope"}});
        let (base, recorded) = spawn_stub(status, reply).await;
        let client = OpenAiClient::new("sk-test", &config(&base)).unwrap();

        let result = client.complete(&prompt()).await;

        match result {
            Err(AnalysisError::Upstream { status: got, body }) => {
                assert_eq!(got, status.as_u16());
                assert!(body.contains("nope"));
            }
            other => panic!("expected an upstream error, got {:?}", other),
        }
        assert_eq!(recorded.lock().unwrap().hits, 1);
    }
}

#[tokio::test]
async fn test_missing_choices_is_schema_error() {
    let (base, _) = spawn_stub(StatusCode::OK, json!({"choices": []})).await;
    let client = OpenAiClient::new("sk-test", &config(&base)).unwrap();

    let result = client.complete(&prompt()).await;

    assert!(matches!(result, Err(AnalysisError::Schema(_))));
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    let client = OpenAiClient::new("sk-test", &config("http://127.0.0.1:1/v1")).unwrap();

    let result = client.complete(&prompt()).await;

    assert!(matches!(result, Err(AnalysisError::Transport { .. })));
}
