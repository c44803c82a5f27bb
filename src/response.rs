//! Normalized responses returned by every provider.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A complete, non-streaming answer from a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelResponse {
    pub text: String,
    /// Provider name as given in the request configuration.
    pub provider: String,
    /// Model identifier as given in the request configuration.
    pub model: String,
    /// Wall time from just before dispatch to the full response.
    pub latency_ms: u64,
}

impl ModelResponse {
    pub fn new(
        text: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
        latency: Duration,
    ) -> Self {
        Self {
            text: text.into(),
            provider: provider.into(),
            model: model.into(),
            latency_ms: u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
        }
    }
}
