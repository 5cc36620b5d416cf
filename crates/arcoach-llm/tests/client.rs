//! Integration tests for `LlmClient` using wiremock HTTP mocks.

use arcoach_core::TextGenerator;
use arcoach_llm::{LlmClient, LlmError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> LlmClient {
    LlmClient::with_base_url("test-key", "gpt-4o", 0.7, 30, base_url)
        .expect("client construction should not fail")
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn complete_returns_trimmed_first_choice() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o",
            "messages": [{ "role": "user", "content": "Write a nudge." }]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("\n  Send more AI interviews.\nBest, ARC  \n")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let reply = test_client(&server.uri())
        .complete("Write a nudge.")
        .await
        .expect("should return completion");
    assert_eq!(reply, "Send more AI interviews.\nBest, ARC");
}

#[tokio::test]
async fn api_error_carries_provider_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
        })))
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).complete("hi").await.unwrap_err();
    match err {
        LlmError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided");
        }
        other => panic!("expected Api error, got: {other}"),
    }
}

#[tokio::test]
async fn blank_content_is_an_empty_completion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("   ")))
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).complete("hi").await.unwrap_err();
    assert!(matches!(err, LlmError::EmptyCompletion));
}

#[tokio::test]
async fn missing_choices_is_an_empty_completion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
        )
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).complete("hi").await.unwrap_err();
    assert!(matches!(err, LlmError::EmptyCompletion));
}

#[tokio::test]
async fn generate_degrades_failures_to_none() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert_eq!(client.generate("hi").await, None);
}

#[tokio::test]
async fn generate_returns_message_on_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Nice work.")))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert_eq!(client.generate("hi").await.as_deref(), Some("Nice work."));
}
