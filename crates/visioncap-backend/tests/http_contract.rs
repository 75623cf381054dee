//! HTTP contract tests against a mock server, one per backend kind

use mockito::Matcher;
use serde_json::json;
use visioncap_backend::BackendClient;
use visioncap_types::{AnalysisRequest, BackendConfig, BackendError, BackendKind};

fn client_for(kind: BackendKind, base_url: &str) -> BackendClient {
    let mut config = BackendConfig::new(kind, "test-model").with_base_url(base_url);
    if kind.requires_api_key() {
        config = config.with_api_key("sk-test");
    }
    BackendClient::new(config).unwrap()
}

#[tokio::test]
async fn ollama_generate_returns_response_text() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/generate")
        .match_body(Matcher::PartialJson(json!({
            "model": "test-model",
            "prompt": "describe",
            "stream": false,
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"response": "a red fox on snow"}"#)
        .create_async()
        .await;

    let client = client_for(BackendKind::Ollama, &server.url());
    let request = AnalysisRequest::for_image(vec![1, 2, 3], "image/png", "describe");

    let text = client.send(&request).await.unwrap();
    assert_eq!(text, "a red fox on snow");
    mock.assert_async().await;
}

#[tokio::test]
async fn openai_chat_sends_bearer_and_returns_first_choice() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"choices": [{"message": {"role": "assistant", "content": "two cats"}, "finish_reason": "stop"}]}"#,
        )
        .create_async()
        .await;

    let client = client_for(BackendKind::OpenAi, &server.url());
    let request = AnalysisRequest::for_image(vec![9], "image/jpeg", "what do you see");

    let text = client.send(&request).await.unwrap();
    assert_eq!(text, "two cats");
    mock.assert_async().await;
}

#[tokio::test]
async fn openrouter_sends_title_header_and_extended_knobs() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_header("x-title", "visioncap")
        .match_body(Matcher::PartialJson(json!({
            "top_k": 40,
            "min_p": 0.0,
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices": [{"message": {"role": "assistant", "content": "ok"}, "finish_reason": null}]}"#)
        .create_async()
        .await;

    let client = client_for(BackendKind::OpenRouter, &server.url());
    let request = AnalysisRequest::for_text("hello");

    let text = client.send(&request).await.unwrap();
    assert_eq!(text, "ok");
    mock.assert_async().await;
}

#[tokio::test]
async fn textgen_completion_returns_text() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/completions")
        .match_body(Matcher::PartialJson(json!({"prompt": "improve this"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices": [{"text": "improved text"}]}"#)
        .create_async()
        .await;

    let client = client_for(BackendKind::TextGen, &server.url());
    let request = AnalysisRequest::for_text("improve this");

    let text = client.send(&request).await.unwrap();
    assert_eq!(text, "improved text");
    mock.assert_async().await;
}

#[tokio::test]
async fn http_401_maps_to_auth_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(401)
        .with_body(r#"{"error": {"message": "invalid api key"}}"#)
        .create_async()
        .await;

    let client = client_for(BackendKind::OpenAi, &server.url());
    let err = client
        .send(&AnalysisRequest::for_text("hi"))
        .await
        .unwrap_err();

    match err {
        BackendError::Auth(message) => assert_eq!(message, "invalid api key"),
        other => panic!("expected Auth, got {:?}", other),
    }
}

#[tokio::test]
async fn http_500_carries_backend_error_payload() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/generate")
        .with_status(500)
        .with_body(r#"{"error": "model failed to load"}"#)
        .create_async()
        .await;

    let client = client_for(BackendKind::Ollama, &server.url());
    let err = client
        .send(&AnalysisRequest::for_text("hi"))
        .await
        .unwrap_err();

    match err {
        BackendError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "model failed to load");
        }
        other => panic!("expected Api, got {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_host_maps_to_network_error() {
    // Nothing listens on this port.
    let client = client_for(BackendKind::Ollama, "http://127.0.0.1:9");
    let err = client
        .send(&AnalysisRequest::for_text("hi"))
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::Network(_)));
}

#[tokio::test]
async fn ollama_list_models_reads_tags() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/tags")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"models": [{"name": "llava:13b"}, {"name": "qwen2-vl"}]}"#)
        .create_async()
        .await;

    let client = client_for(BackendKind::Ollama, &server.url());
    let models = client.list_models().await.unwrap();
    assert_eq!(models, vec!["llava:13b", "qwen2-vl"]);
}

#[tokio::test]
async fn openrouter_list_models_reads_ids_with_auth() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/models")
        .match_header("authorization", "Bearer sk-test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data": [{"id": "meta/llama-3"}, {"id": "openai/gpt-4o"}]}"#)
        .create_async()
        .await;

    let client = client_for(BackendKind::OpenRouter, &server.url());
    let models = client.list_models().await.unwrap();
    assert_eq!(models, vec!["meta/llama-3", "openai/gpt-4o"]);
    mock.assert_async().await;
}
