use reqwest::header::HeaderValue;
use std::sync::Arc;
use std::time::Instant;

use super::types::{ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse};
use crate::provider::ModelProvider;
use crate::providers::shared::{
    credential_header, decode_body, encode_body, require_api_key, resolve_endpoint, WireMessage,
};
use crate::streaming::{decode_sse, EventAction, FragmentStream, SkipCounter};
use crate::transport::{HttpRequest, Transport};
use crate::{ChatMessage, Error, ModelConfiguration, ModelResponse};

/// Default Chat Completions endpoint.
pub const OPENAI_DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Provider for OpenAI and OpenAI-compatible Chat Completions APIs.
pub struct OpenAIProvider {
    transport: Arc<dyn Transport>,
    skipped: SkipCounter,
}

impl OpenAIProvider {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            skipped: SkipCounter::new(),
        }
    }

    /// Number of stream events that could not be decoded and were skipped.
    pub fn skipped_events(&self) -> u64 {
        self.skipped.get()
    }

    /// Validate the configuration and build the HTTP request.
    fn build_request(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfiguration,
        stream: bool,
    ) -> Result<HttpRequest, Error> {
        let api_key = require_api_key(config)?;
        let url = resolve_endpoint(config, OPENAI_DEFAULT_ENDPOINT)?;
        config.validate()?;

        let body = ChatCompletionRequest {
            model: &config.model,
            messages: messages.iter().map(WireMessage::from_message).collect(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            stream: stream.then_some(true),
        };

        Ok(HttpRequest::post_json(url, encode_body(&body)?)
            .with_header("authorization", credential_header(&format!("Bearer {api_key}"))?))
    }

    fn decode_event(payload: &str) -> Result<EventAction, serde_json::Error> {
        let chunk: ChatCompletionChunk = serde_json::from_str(payload)?;
        let content = chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta)
            .and_then(|delta| delta.content);

        Ok(match content {
            Some(text) if !text.is_empty() => EventAction::Emit(text),
            _ => EventAction::Skip,
        })
    }
}

#[async_trait::async_trait]
impl ModelProvider for OpenAIProvider {
    async fn send_prompt(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfiguration,
    ) -> Result<ModelResponse, Error> {
        let started = Instant::now();
        let request = self.build_request(messages, config, false)?;

        let response = self.transport.request(request).await?;
        let completion: ChatCompletionResponse = decode_body(&response.body)?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::invalid_response("missing choices[0].message.content"))?;

        Ok(ModelResponse::new(
            text,
            &config.provider,
            &config.model,
            started.elapsed(),
        ))
    }

    async fn send_prompt_streaming(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfiguration,
    ) -> Result<FragmentStream, Error> {
        let request = self
            .build_request(messages, config, true)?
            .with_header("accept", HeaderValue::from_static("text/event-stream"));

        let lines = self.transport.stream_request(request).await?;
        Ok(decode_sse(
            lines,
            "openai",
            Self::decode_event,
            self.skipped.clone(),
        ))
    }

    fn supports_streaming(&self) -> bool {
        true
    }
}
