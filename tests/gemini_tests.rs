// tests/gemini_tests.rs

//! Runs the real Gemini client against a local stand-in for the API.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
};
use fiteats::generation::{GeminiGenerator, GenerationError, Generator, TaskKind};
use serde_json::{Value, json};

#[derive(Debug, Clone)]
struct Recorded {
    path: String,
    api_key: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct Mock {
    status: StatusCode,
    reply: Value,
    seen: Arc<Mutex<Vec<Recorded>>>,
}

async fn answer(
    State(mock): State<Mock>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    mock.seen.lock().unwrap().push(Recorded {
        path: uri.path().to_string(),
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });
    (mock.status, Json(mock.reply.clone()))
}

/// Starts the stand-in and returns a client pointed at it plus the request log.
async fn spawn_mock(status: StatusCode, reply: Value) -> (GeminiGenerator, Arc<Mutex<Vec<Recorded>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mock = Mock {
        status,
        reply,
        seen: seen.clone(),
    };
    let app = Router::new().fallback(answer).with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let generator = GeminiGenerator::new(
        "test-key",
        "gemini-test",
        format!("http://127.0.0.1:{}/v1beta/", port),
        Duration::from_secs(5),
    )
    .unwrap();
    (generator, seen)
}

fn candidate(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] }
        }]
    })
}

#[tokio::test]
async fn sends_a_schema_bound_request() {
    let (generator, seen) = spawn_mock(StatusCode::OK, candidate(r#"{"meals":[]}"#)).await;

    let text = generator
        .generate(TaskKind::DayMealEdit, "Swap lunch for something lighter")
        .await
        .unwrap();
    assert_eq!(text, r#"{"meals":[]}"#);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let request = &seen[0];
    assert_eq!(request.path, "/v1beta/models/gemini-test:generateContent");
    assert_eq!(request.api_key.as_deref(), Some("test-key"));

    let body = &request.body;
    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(
        body["contents"][0]["parts"][0]["text"],
        "Swap lunch for something lighter"
    );
    assert!(body["systemInstruction"]["parts"][0]["text"].is_string());

    let config = &body["generationConfig"];
    assert_eq!(config["temperature"], 0.0);
    assert_eq!(config["topK"], 40);
    assert_eq!(config["maxOutputTokens"], 8192);
    assert_eq!(config["responseMimeType"], "application/json");
    assert_eq!(config["responseSchema"]["type"], "OBJECT");
    assert_eq!(config["responseSchema"]["required"], json!(["meals"]));
}

#[tokio::test]
async fn model_configuration_is_built_once_per_kind() {
    let (generator, _) = spawn_mock(StatusCode::OK, candidate("{}")).await;
    let generator = Arc::new(generator);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let generator = generator.clone();
        handles.push(tokio::spawn(async move {
            generator.generate(TaskKind::Tdee, "prompt").await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    generator.generate(TaskKind::Macros, "prompt").await.unwrap();

    assert_eq!(generator.models_built(), 2);
}

#[tokio::test]
async fn error_status_carries_the_api_message() {
    let (generator, _) = spawn_mock(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": { "code": 500, "message": "backend overloaded" } }),
    )
    .await;

    let err = generator.generate(TaskKind::Tdee, "prompt").await.unwrap_err();
    match err {
        GenerationError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "backend overloaded");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn no_candidates_is_an_empty_response() {
    let (generator, _) = spawn_mock(StatusCode::OK, json!({ "candidates": [] })).await;

    let err = generator.generate(TaskKind::Tdee, "prompt").await.unwrap_err();
    assert!(matches!(err, GenerationError::EmptyResponse));
}
