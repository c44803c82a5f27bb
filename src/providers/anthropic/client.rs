use reqwest::header::HeaderValue;
use std::sync::Arc;
use std::time::Instant;

use super::types::{MessagesRequest, MessagesResponse, StreamEvent};
use crate::provider::ModelProvider;
use crate::providers::shared::{
    credential_header, decode_body, encode_body, require_api_key, resolve_endpoint, WireMessage,
};
use crate::streaming::{decode_sse, EventAction, FragmentStream, SkipCounter};
use crate::transport::{HttpRequest, Transport};
use crate::{ChatMessage, Error, ModelConfiguration, ModelResponse, Role};

/// Default Messages API endpoint.
pub const ANTHROPIC_DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";

/// Value sent in the `anthropic-version` header.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// `max_tokens` is mandatory for this API; used when the caller sets none.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Provider for the Anthropic Messages API.
pub struct AnthropicProvider {
    transport: Arc<dyn Transport>,
    skipped: SkipCounter,
}

impl AnthropicProvider {
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

    /// System turns are sent as user turns; the plain message array has no
    /// slot for them.
    fn convert_message(message: &ChatMessage) -> WireMessage<'_> {
        let role = match message.role {
            Role::System | Role::User => Role::User,
            Role::Assistant => Role::Assistant,
        };
        WireMessage {
            role: role.as_str(),
            content: &message.content,
        }
    }

    fn build_request(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfiguration,
        stream: bool,
    ) -> Result<HttpRequest, Error> {
        let api_key = require_api_key(config)?;
        let url = resolve_endpoint(config, ANTHROPIC_DEFAULT_ENDPOINT)?;
        config.validate()?;

        let body = MessagesRequest {
            model: &config.model,
            messages: messages.iter().map(Self::convert_message).collect(),
            max_tokens: config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: config.temperature,
            stream: stream.then_some(true),
        };

        Ok(HttpRequest::post_json(url, encode_body(&body)?)
            .with_header("x-api-key", credential_header(api_key)?)
            .with_header("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION)))
    }

    fn decode_event(payload: &str) -> Result<EventAction, serde_json::Error> {
        Ok(match serde_json::from_str::<StreamEvent>(payload)? {
            StreamEvent::ContentBlockDelta { delta } => match delta.text {
                Some(text) => EventAction::Emit(text),
                None => EventAction::Skip,
            },
            StreamEvent::MessageStop => EventAction::Stop,
            StreamEvent::Other => EventAction::Skip,
        })
    }
}

#[async_trait::async_trait]
impl ModelProvider for AnthropicProvider {
    async fn send_prompt(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfiguration,
    ) -> Result<ModelResponse, Error> {
        let started = Instant::now();
        let request = self.build_request(messages, config, false)?;

        let response = self.transport.request(request).await?;
        let message: MessagesResponse = decode_body(&response.body)?;

        let text = message
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or_else(|| Error::invalid_response("missing content[0].text"))?;

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
            "claude",
            Self::decode_event,
            self.skipped.clone(),
        ))
    }

    fn supports_streaming(&self) -> bool {
        true
    }
}
