//! Name-based dispatch to registered providers.

use futures_util::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::provider::ModelProvider;
use crate::providers::{AnthropicProvider, MockProvider, OpenAIProvider};
use crate::streaming::FragmentStream;
use crate::transport::Transport;
use crate::{ChatMessage, Error, ModelConfiguration, ModelResponse};

/// Holds the provider registry and picks a provider per request.
///
/// Lookups clone the provider handle out of the registry, so no lock is held
/// while a request is in flight.
pub struct ModelRouter {
    providers: RwLock<HashMap<String, Arc<dyn ModelProvider>>>,
}

impl ModelRouter {
    /// Create a router with the built-in `openai`, `claude` and `mock`
    /// providers, the first two sharing `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let mut providers: HashMap<String, Arc<dyn ModelProvider>> = HashMap::new();
        providers.insert(
            "openai".to_string(),
            Arc::new(OpenAIProvider::new(Arc::clone(&transport))),
        );
        providers.insert(
            "claude".to_string(),
            Arc::new(AnthropicProvider::new(transport)),
        );
        providers.insert("mock".to_string(), Arc::new(MockProvider::new()));

        Self {
            providers: RwLock::new(providers),
        }
    }

    /// Register a provider under `name`, replacing any previous entry.
    pub fn register_provider(&self, name: &str, provider: Arc<dyn ModelProvider>) {
        let key = name.to_lowercase();
        tracing::debug!(provider = %key, "registering provider");
        self.providers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, provider);
    }

    /// Registered provider names, sorted.
    pub fn provider_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    fn resolve(&self, name: &str) -> Option<Arc<dyn ModelProvider>> {
        self.providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&name.to_lowercase())
            .cloned()
    }

    fn require(&self, name: &str) -> Result<Arc<dyn ModelProvider>, Error> {
        self.resolve(name)
            .ok_or_else(|| Error::UnsupportedProvider(name.to_string()))
    }

    pub async fn send_prompt(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfiguration,
    ) -> Result<ModelResponse, Error> {
        let provider = self.require(&config.provider)?;
        provider.send_prompt(messages, config).await
    }

    /// Stream from the configured provider.
    ///
    /// Providers that cannot stream are called once without streaming and
    /// their full answer is delivered as a single fragment.
    pub async fn send_prompt_streaming(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfiguration,
    ) -> Result<FragmentStream, Error> {
        let provider = self.require(&config.provider)?;

        if provider.supports_streaming() {
            return provider.send_prompt_streaming(messages, config).await;
        }

        tracing::debug!(provider = %config.provider, "provider cannot stream, sending one fragment");
        let messages = messages.to_vec();
        let config = config.clone();
        Ok(stream::once(async move {
            provider
                .send_prompt(&messages, &config)
                .await
                .map(|response| response.text)
        })
        .boxed())
    }

    /// Whether the named provider streams natively; `false` if unknown.
    pub fn supports_streaming(&self, provider: &str) -> bool {
        self.resolve(provider)
            .is_some_and(|provider| provider.supports_streaming())
    }
}
