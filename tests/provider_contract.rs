mod common;

use common::FakeTransport;
use futures::StreamExt;
use prompt_gateway::{
    AnthropicProvider, ChatMessage, Error, ModelConfiguration, ModelProvider, OpenAIProvider,
};
use serde_json::json;
use std::sync::Arc;
use tokio_test::assert_ok;

fn openai_config() -> ModelConfiguration {
    ModelConfiguration::new("openai", "gpt-4o-mini").with_api_key("sk-test")
}

fn claude_config() -> ModelConfiguration {
    ModelConfiguration::new("claude", "claude-3-5-haiku-latest").with_api_key("sk-ant-test")
}

fn hello() -> Vec<ChatMessage> {
    vec![ChatMessage::user("Hello")]
}

async fn collect_fragments(provider: &dyn ModelProvider, config: &ModelConfiguration) -> Vec<String> {
    provider
        .send_prompt_streaming(&hello(), config)
        .await
        .expect("stream should open")
        .map(|fragment| fragment.expect("fragment should decode"))
        .collect()
        .await
}

#[tokio::test]
async fn test_missing_api_key_never_reaches_transport() {
    let transport = Arc::new(FakeTransport::json(json!({})));
    let openai = OpenAIProvider::new(transport.clone());
    let claude = AnthropicProvider::new(transport.clone());

    let no_key = ModelConfiguration::new("openai", "gpt-4o-mini");
    let empty_key = no_key.clone().with_api_key("");

    for config in [&no_key, &empty_key] {
        assert!(matches!(
            openai.send_prompt(&hello(), config).await,
            Err(Error::MissingApiKey)
        ));
        assert!(matches!(
            openai.send_prompt_streaming(&hello(), config).await,
            Err(Error::MissingApiKey)
        ));
        assert!(matches!(
            claude.send_prompt(&hello(), config).await,
            Err(Error::MissingApiKey)
        ));
        assert!(matches!(
            claude.send_prompt_streaming(&hello(), config).await,
            Err(Error::MissingApiKey)
        ));
    }

    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_invalid_endpoint_never_reaches_transport() {
    let transport = Arc::new(FakeTransport::json(json!({})));
    let provider = OpenAIProvider::new(transport.clone());
    let config = openai_config().with_endpoint("::not a url::");

    assert!(matches!(
        provider.send_prompt(&hello(), &config).await,
        Err(Error::InvalidEndpoint(_))
    ));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_out_of_range_temperature_is_rejected() {
    let transport = Arc::new(FakeTransport::json(json!({})));
    let provider = AnthropicProvider::new(transport.clone());
    let config = claude_config().with_temperature(3.0);

    assert!(matches!(
        provider.send_prompt(&hello(), &config).await,
        Err(Error::InvalidRequest(_))
    ));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_error_status_becomes_api_error() {
    let transport = Arc::new(FakeTransport::body(401, "unauthorized"));

    let providers: [Box<dyn ModelProvider>; 2] = [
        Box::new(OpenAIProvider::new(transport.clone())),
        Box::new(AnthropicProvider::new(transport.clone())),
    ];
    let configs = [openai_config(), claude_config()];

    for (provider, config) in providers.iter().zip(configs.iter()) {
        match provider.send_prompt(&hello(), config).await {
            Err(Error::Api { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "unauthorized");
            }
            other => panic!("Expected ApiError, got {other:?}"),
        }

        match provider.send_prompt_streaming(&hello(), config).await {
            Err(err) => assert_eq!(err.status(), Some(401)),
            Ok(_) => panic!("stream should not open on 401"),
        }
    }
}

#[tokio::test]
async fn test_openai_success_response() {
    let transport = Arc::new(FakeTransport::json(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "Paris"},
            "finish_reason": "stop"
        }]
    })));
    let provider = OpenAIProvider::new(transport.clone());
    let config = openai_config().with_temperature(0.2);

    let response = assert_ok!(provider.send_prompt(&hello(), &config).await);
    assert_eq!(response.text, "Paris");
    assert_eq!(response.provider, "openai");
    assert_eq!(response.model, "gpt-4o-mini");

    let request = transport.last_request();
    assert_eq!(
        request.url.as_str(),
        "https://api.openai.com/v1/chat/completions"
    );
    assert_eq!(request.headers["authorization"], "Bearer sk-test");
    assert_eq!(transport.last_body()["temperature"], 0.2);
    assert!(transport.last_body().get("stream").is_none());
}

#[tokio::test]
async fn test_anthropic_success_response() {
    let transport = Arc::new(FakeTransport::json(json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": "Bonjour"}],
        "stop_reason": "end_turn"
    })));
    let provider = AnthropicProvider::new(transport.clone());
    let config = claude_config().with_endpoint("https://proxy.internal/v1/messages");

    let response = assert_ok!(provider.send_prompt(&hello(), &config).await);
    assert_eq!(response.text, "Bonjour");
    assert_eq!(response.provider, "claude");

    let request = transport.last_request();
    assert_eq!(request.url.as_str(), "https://proxy.internal/v1/messages");
    assert_eq!(request.headers["x-api-key"], "sk-ant-test");
    assert_eq!(request.headers["anthropic-version"], "2023-06-01");
    assert_eq!(transport.last_body()["max_tokens"], 2000);
}

#[tokio::test]
async fn test_incomplete_success_body_is_invalid_response() {
    let cases = [
        (json!({"choices": []}), json!({"content": []})),
        (
            json!({"choices": [{"message": {"role": "assistant"}}]}),
            json!({"content": [{"type": "tool_use", "id": "t", "name": "n", "input": {}}]}),
        ),
    ];

    for (openai_body, claude_body) in cases {
        let openai = OpenAIProvider::new(Arc::new(FakeTransport::json(openai_body)));
        assert!(matches!(
            openai.send_prompt(&hello(), &openai_config()).await,
            Err(Error::InvalidResponse(_))
        ));

        let claude = AnthropicProvider::new(Arc::new(FakeTransport::json(claude_body)));
        assert!(matches!(
            claude.send_prompt(&hello(), &claude_config()).await,
            Err(Error::InvalidResponse(_))
        ));
    }

    let garbage = OpenAIProvider::new(Arc::new(FakeTransport::body(200, "<html>oops</html>")));
    assert!(matches!(
        garbage.send_prompt(&hello(), &openai_config()).await,
        Err(Error::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_openai_stream_fixture() {
    let transport = Arc::new(FakeTransport::lines(&[
        r#"data: {"choices":[{"delta":{"content":"Hel"}}]}"#,
        r#"data: {"choices":[{"delta":{"content":"lo"}}]}"#,
        "data: [DONE]",
    ]));
    let provider = OpenAIProvider::new(transport.clone());

    let fragments = collect_fragments(&provider, &openai_config()).await;
    assert_eq!(fragments, vec!["Hel", "lo"]);
    assert_eq!(fragments.concat(), "Hello");
    assert_eq!(transport.last_body()["stream"], true);
    assert_eq!(provider.skipped_events(), 0);
}

#[tokio::test]
async fn test_openai_stream_skips_noise() {
    let transport = Arc::new(FakeTransport::lines(&[
        ": keep-alive",
        r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#,
        "",
        r#"data: {"choices":[{"delta":{"content":"A"}}]}"#,
        "data: {truncated",
        "event: unexpected",
        r#"data: {"choices":[{"delta":{"content":"B"}}]}"#,
        "data: [DONE]",
        r#"data: {"choices":[{"delta":{"content":"after done"}}]}"#,
    ]));
    let provider = OpenAIProvider::new(transport);

    let fragments = collect_fragments(&provider, &openai_config()).await;
    assert_eq!(fragments, vec!["A", "B"]);
    assert_eq!(provider.skipped_events(), 1);
}

#[tokio::test]
async fn test_anthropic_stream_stops_at_message_stop() {
    let transport = Arc::new(FakeTransport::lines(&[
        "event: message_start",
        r#"data: {"type":"message_start","message":{"id":"msg_1","role":"assistant","content":[]}}"#,
        "event: content_block_start",
        r#"data: {"type":"content_block_start","index":0,"content_block":{"type":"text","text":""}}"#,
        r#"data: {"type":"ping"}"#,
        "event: content_block_delta",
        r#"data: {"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hello"}}"#,
        r#"data: {"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":" world"}}"#,
        r#"data: {"type":"content_block_stop","index":0}"#,
        "event: message_stop",
        r#"data: {"type":"message_stop"}"#,
        r#"data: {"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":" never"}}"#,
    ]));
    let provider = AnthropicProvider::new(transport.clone());

    let fragments = collect_fragments(&provider, &claude_config()).await;
    assert_eq!(fragments, vec!["Hello", " world"]);
    assert_eq!(provider.skipped_events(), 0);
    assert_eq!(transport.last_body()["stream"], true);
}

#[tokio::test]
async fn test_anthropic_stream_tolerates_malformed_events() {
    let transport = Arc::new(FakeTransport::lines(&[
        r#"data: {"type":"content_block_delta","delta":{"type":"text_delta","text":"ok"}}"#,
        "data: not json at all",
        r#"data: {"delta":{"text":"untyped"}}"#,
        r#"data: {"type":"content_block_delta","delta":{"type":"text_delta","text":"!"}}"#,
    ]));
    let provider = AnthropicProvider::new(transport);

    let fragments = collect_fragments(&provider, &claude_config()).await;
    assert_eq!(fragments, vec!["ok", "!"]);
    assert_eq!(provider.skipped_events(), 2);
}

#[tokio::test]
async fn test_mid_stream_failure_ends_stream() {
    let (transport, tx) = FakeTransport::channel();
    let provider = OpenAIProvider::new(Arc::new(transport));

    tx.unbounded_send(Ok(r#"data: {"choices":[{"delta":{"content":"par"}}]}"#.to_string()))
        .unwrap();
    tx.unbounded_send(Err(prompt_gateway::TransportError::network("connection reset")))
        .unwrap();

    let mut stream = provider
        .send_prompt_streaming(&hello(), &openai_config())
        .await
        .unwrap();

    assert_eq!(stream.next().await.unwrap().unwrap(), "par");
    assert!(matches!(stream.next().await, Some(Err(Error::Network(_)))));
    assert!(stream.next().await.is_none());
}
