//! Entry point for applications.

use std::sync::Arc;

use crate::provider::ModelProvider;
use crate::router::ModelRouter;
use crate::streaming::FragmentStream;
use crate::transport::{ReqwestTransport, Transport};
use crate::{ChatMessage, Error, ModelConfiguration, ModelResponse};

/// Sends conversations to whichever provider a configuration names.
///
/// ```no_run
/// use prompt_gateway::{ChatMessage, Gateway, ModelConfiguration};
///
/// # async fn run() -> Result<(), prompt_gateway::Error> {
/// let gateway = Gateway::new()?;
/// let config = ModelConfiguration::new("mock", "mock-model");
/// let response = gateway
///     .send_message(&[ChatMessage::user("hi")], &config)
///     .await?;
/// println!("{}", response.text);
/// # Ok(())
/// # }
/// ```
pub struct Gateway {
    router: ModelRouter,
}

impl Gateway {
    /// Create a gateway using a default `reqwest` transport.
    pub fn new() -> Result<Self, Error> {
        Ok(Self::with_transport(Arc::new(ReqwestTransport::new()?)))
    }

    /// Create a gateway whose network providers use `transport`.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            router: ModelRouter::new(transport),
        }
    }

    /// Add or replace a provider, matched case-insensitively by `name`.
    pub fn register_provider(&self, name: &str, provider: Arc<dyn ModelProvider>) {
        self.router.register_provider(name, provider);
    }

    pub async fn send_message(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfiguration,
    ) -> Result<ModelResponse, Error> {
        self.router.send_prompt(messages, config).await
    }

    pub async fn send_message_streaming(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfiguration,
    ) -> Result<FragmentStream, Error> {
        self.router.send_prompt_streaming(messages, config).await
    }

    pub fn supports_streaming(&self, provider: &str) -> bool {
        self.router.supports_streaming(provider)
    }
}
