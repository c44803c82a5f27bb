use serde::{Deserialize, Serialize};
use std::env;

use crate::Error;

/// Per-request provider and model parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfiguration {
    /// Registry key, matched case-insensitively.
    pub provider: String,
    /// Vendor model identifier.
    pub model: String,
    pub api_key: Option<String>,
    /// Overrides the vendor's default URL.
    pub endpoint: Option<String>,
    /// Sampling temperature in `[0, 2]`.
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl ModelConfiguration {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            api_key: None,
            endpoint: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// The API key, if present and non-empty.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }

    /// Check the sampling parameters against their documented ranges.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(Error::invalid_request(format!(
                    "temperature must be within [0, 2], got {temperature}"
                )));
            }
        }
        if self.max_tokens == Some(0) {
            return Err(Error::invalid_request("max_tokens must be positive"));
        }
        Ok(())
    }

    /// Create configuration from environment variables.
    ///
    /// `GATEWAY_PROVIDER` selects the provider (default `mock`). The key is read
    /// from `GATEWAY_API_KEY`, falling back to `OPENAI_API_KEY` or
    /// `ANTHROPIC_API_KEY` depending on the provider.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = lookup("GATEWAY_PROVIDER")
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "mock".to_string());

        let (default_model, key_var) = match provider.to_lowercase().as_str() {
            "openai" => ("gpt-4o-mini", Some("OPENAI_API_KEY")),
            "claude" => ("claude-3-5-haiku-latest", Some("ANTHROPIC_API_KEY")),
            _ => ("mock-model", None),
        };

        let model = lookup("GATEWAY_MODEL").unwrap_or_else(|| default_model.to_string());
        let api_key = lookup("GATEWAY_API_KEY").or_else(|| key_var.and_then(&lookup));

        let temperature = match lookup("GATEWAY_TEMPERATURE") {
            Some(raw) => Some(raw.parse::<f64>().map_err(|_| {
                Error::config(format!("GATEWAY_TEMPERATURE is not a number: '{raw}'"))
            })?),
            None => None,
        };

        let max_tokens = match lookup("GATEWAY_MAX_TOKENS") {
            Some(raw) => Some(raw.parse::<u32>().map_err(|_| {
                Error::config(format!(
                    "GATEWAY_MAX_TOKENS is not a positive integer: '{raw}'"
                ))
            })?),
            None => None,
        };

        Ok(Self {
            provider,
            model,
            api_key,
            endpoint: lookup("GATEWAY_ENDPOINT"),
            temperature,
            max_tokens,
        })
    }
}
