use crate::streaming::FragmentStream;
use crate::{ChatMessage, Error, ModelConfiguration, ModelResponse};

/// A backend that can answer a conversation.
///
/// Implementations are immutable after construction and shared between
/// concurrent requests.
#[async_trait::async_trait]
pub trait ModelProvider: Send + Sync + 'static {
    /// Send the conversation and wait for the complete answer.
    async fn send_prompt(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfiguration,
    ) -> Result<ModelResponse, Error>;

    /// Send the conversation and stream the answer as it is generated.
    ///
    /// Failures known before the first fragment are returned directly; later
    /// failures end the stream with an `Err` item.
    async fn send_prompt_streaming(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfiguration,
    ) -> Result<FragmentStream, Error>;

    /// Whether `send_prompt_streaming` streams natively.
    fn supports_streaming(&self) -> bool;
}
