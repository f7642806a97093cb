use miku_llm::{
    ChatMessage, GenerationParams, LanguageModel, LlmClientConfig, LlmError, OpenAiCompatClient,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OpenAiCompatClient {
    OpenAiCompatClient::new(LlmClientConfig {
        base_url: format!("{}/openai/v1", server.uri()),
        api_key: "test-key".to_string(),
        timeout: Duration::from_millis(500),
    })
    .unwrap()
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "llama-3.1-8b-instant",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn sends_model_parameters_and_returns_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "llama-3.1-8b-instant",
            "temperature": 0.8,
            "max_tokens": 300,
            "messages": [
                {"role": "system", "content": "persona"},
                {"role": "user", "content": "Hello Miku"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("[happy] Hello bhaiya!")))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .generate(
            &[ChatMessage::system("persona"), ChatMessage::user("Hello Miku")],
            &GenerationParams::default(),
        )
        .await
        .unwrap();

    assert_eq!(reply, "[happy] Hello bhaiya!");
}

#[tokio::test]
async fn quota_error_is_reported_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limit exceeded"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate(&[ChatMessage::user("hi")], &GenerationParams::default())
        .await
        .unwrap_err();

    match err {
        LlmError::Status { status, body } => {
            assert_eq!(status, 429);
            assert!(body.contains("rate limit"));
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate(&[ChatMessage::user("hi")], &GenerationParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::Malformed(_)), "got {err:?}");
}

#[tokio::test]
async fn empty_choices_and_blank_content_are_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("   ")))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = client
        .generate(&[ChatMessage::user("hi")], &GenerationParams::default())
        .await
        .unwrap_err();
    assert!(matches!(first, LlmError::Malformed(_)), "got {first:?}");

    let second = client
        .generate(&[ChatMessage::user("hi")], &GenerationParams::default())
        .await
        .unwrap_err();
    assert!(matches!(second, LlmError::EmptyReply), "got {second:?}");
}

#[tokio::test]
async fn slow_provider_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("late"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate(&[ChatMessage::user("hi")], &GenerationParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::Timeout), "got {err:?}");
}

#[tokio::test]
async fn missing_api_key_short_circuits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let client = OpenAiCompatClient::new(LlmClientConfig {
        base_url: server.uri(),
        api_key: "  ".to_string(),
        timeout: Duration::from_secs(1),
    })
    .unwrap();

    let err = client
        .generate(&[ChatMessage::user("hi")], &GenerationParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey));
}
