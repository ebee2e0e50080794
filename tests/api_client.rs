//! HTTP-level tests for the chat-completions client against a stub
//! server.

use promptforge::api::{ApiClient, ChatMessage, ModelClient};
use promptforge::config::AiConfig;
use promptforge::error::ModelError;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> AiConfig {
    AiConfig {
        model: "gpt-3.5-turbo".to_string(),
        api_url: format!("{}/v1", server.uri()),
        api_key: "test-key".to_string(),
    }
}

#[tokio::test]
async fn completes_and_records_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "messages": [{"role": "user", "content": "hi"}],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "hello there"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&config_for(&server)).expect("client");
    let content = client
        .complete(&[ChatMessage::user("hi")], 0.7)
        .await
        .expect("completion");

    assert_eq!(content, "hello there");
    let usage = client.usage_summary();
    assert_eq!(usage.calls, 1);
    assert_eq!(usage.total_tokens, 16);
    assert!(usage.total_cost > 0.0);
}

#[tokio::test]
async fn http_error_is_fatal_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&config_for(&server)).expect("client");
    let err = client
        .complete(&[ChatMessage::user("hi")], 0.7)
        .await
        .expect_err("500 must surface");

    match err {
        ModelError::Api { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("upstream exploded"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn empty_choices_surface_as_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [],
            "usage": null
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(&config_for(&server)).expect("client");
    let err = client
        .complete(&[ChatMessage::user("hi")], 0.7)
        .await
        .expect_err("no choices must surface");
    assert!(matches!(err, ModelError::EmptyResponse));
}
