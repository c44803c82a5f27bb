//! Request plumbing shared by the HTTP-backed providers.

use bytes::Bytes;
use reqwest::header::HeaderValue;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{ChatMessage, Error, ModelConfiguration};

/// `{role, content}` as both vendors expect it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

impl<'a> WireMessage<'a> {
    pub fn from_message(message: &'a ChatMessage) -> Self {
        Self {
            role: message.role.as_str(),
            content: &message.content,
        }
    }
}

/// The configured key, or `MissingApiKey` if it is absent or empty.
pub fn require_api_key(config: &ModelConfiguration) -> Result<&str, Error> {
    config.api_key().ok_or(Error::MissingApiKey)
}

/// The endpoint override if present, otherwise `default`.
pub fn resolve_endpoint(config: &ModelConfiguration, default: &str) -> Result<Url, Error> {
    let raw = config.endpoint.as_deref().unwrap_or(default);
    Url::parse(raw).map_err(|e| Error::InvalidEndpoint(format!("{raw}: {e}")))
}

pub fn credential_header(value: &str) -> Result<HeaderValue, Error> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|_| Error::invalid_request("API key contains characters not allowed in a header"))?;
    header.set_sensitive(true);
    Ok(header)
}

pub fn encode_body<T: Serialize>(body: &T) -> Result<Bytes, Error> {
    serde_json::to_vec(body)
        .map(Bytes::from)
        .map_err(|e| Error::invalid_request(format!("failed to encode request body: {e}")))
}

pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(|e| Error::invalid_response(e.to_string()))
}
