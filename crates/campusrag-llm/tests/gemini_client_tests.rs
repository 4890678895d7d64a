use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use campusrag_core::types::Completion;
use campusrag_llm::{GeminiClient, LlmError};

fn client_for(server: &MockServer, max_attempts: u32) -> GeminiClient {
    GeminiClient::new(
        "test-key".to_string(),
        "gemini-2.5-flash".to_string(),
        Duration::from_secs(5),
        max_attempts,
    )
    .expect("client")
    .with_endpoint(server.base_url())
}

#[tokio::test]
async fn successful_completion_returns_text() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.5-flash:generateContent")
                .query_param("key", "test-key");
            then.status(200).json_body(json!({
                "candidates": [
                    {"content": {"parts": [{"text": "Paris is the capital of France."}]}}
                ]
            }));
        })
        .await;

    let client = client_for(&server, 3);
    let completion = client.generate("What is the capital of France?").await.expect("generate");
    assert_eq!(completion, Completion::Text("Paris is the capital of France.".to_string()));
    mock.assert_async().await;
}

#[tokio::test]
async fn response_without_text_is_degraded_not_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path_contains(":generateContent");
            then.status(200)
                .json_body(json!({"promptFeedback": {"blockReason": "SAFETY"}}));
        })
        .await;

    let client = client_for(&server, 3);
    let completion = client.generate("blocked question").await.expect("generate");
    assert!(completion.is_degraded());
    assert!(completion.into_text().contains("SAFETY"));
}

#[tokio::test]
async fn server_errors_are_retried_up_to_the_attempt_bound() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path_contains(":generateContent");
            then.status(503).body("overloaded");
        })
        .await;

    let client = client_for(&server, 2);
    let err = client.generate("q").await.expect_err("must fail");
    match err {
        LlmError::Api { status, .. } => assert_eq!(status, 503),
        other => panic!("unexpected error: {other}"),
    }
    mock.assert_hits_async(2).await;
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path_contains(":generateContent");
            then.status(400).json_body(json!({
                "error": {"message": "Invalid request", "status": "INVALID_ARGUMENT"}
            }));
        })
        .await;

    let client = client_for(&server, 3);
    let err = client.generate("q").await.expect_err("must fail");
    match err {
        LlmError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid request");
        }
        other => panic!("unexpected error: {other}"),
    }
    mock.assert_hits_async(1).await;
}
