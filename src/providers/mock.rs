//! Offline provider producing canned answers after a simulated delay.

use futures_util::stream::{self, StreamExt};
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;
use tokio::time::Instant;

use crate::provider::ModelProvider;
use crate::streaming::FragmentStream;
use crate::{ChatMessage, Error, ModelConfiguration, ModelResponse};

/// Bounds of the simulated round trip, in milliseconds.
pub const MIN_DELAY_MS: u64 = 500;
pub const MAX_DELAY_MS: u64 = 1500;

/// Delay before each streamed word.
pub const WORD_DELAY: Duration = Duration::from_millis(100);

const CANNED_REPLIES: [&str; 10] = [
    "That's an interesting question! Let me think about that...",
    "I understand what you're asking. Here's my perspective:",
    "Great point! I'd like to add to that:",
    "I'm here to help! Let me explain:",
    "That's a thoughtful question. Consider this:",
    "Absolutely! Here's what I think:",
    "I appreciate you asking. My response is:",
    "Let me break that down for you:",
    "That's worth exploring further. Here's why:",
    "I'm processing that. Here's my take:",
];

/// Provider that echoes the last message followed by a canned line.
#[derive(Debug, Clone, Default)]
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }

    fn reply_for(messages: &[ChatMessage]) -> Result<String, Error> {
        let last = messages
            .last()
            .ok_or_else(|| Error::invalid_request("at least one message is required"))?;
        let canned = CANNED_REPLIES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or("I'm here to help!");
        Ok(format!("Echo: \"{}\"\n\n{}", last.content, canned))
    }

    /// Split on single spaces, keeping the separator on every word but the
    /// last so the pieces concatenate back to `text`.
    fn words(text: &str) -> Vec<String> {
        let parts: Vec<&str> = text.split(' ').collect();
        let last = parts.len() - 1;
        parts
            .into_iter()
            .enumerate()
            .map(|(i, word)| {
                if i == last {
                    word.to_string()
                } else {
                    format!("{word} ")
                }
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl ModelProvider for MockProvider {
    async fn send_prompt(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfiguration,
    ) -> Result<ModelResponse, Error> {
        let started = Instant::now();
        let text = Self::reply_for(messages)?;

        let delay = rand::thread_rng().gen_range(MIN_DELAY_MS..=MAX_DELAY_MS);
        tokio::time::sleep(Duration::from_millis(delay)).await;

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
        _config: &ModelConfiguration,
    ) -> Result<FragmentStream, Error> {
        let text = Self::reply_for(messages)?;

        Ok(stream::iter(Self::words(&text))
            .then(|word| async move {
                tokio::time::sleep(WORD_DELAY).await;
                Ok(word)
            })
            .boxed())
    }

    fn supports_streaming(&self) -> bool {
        true
    }
}
