//! HTTP transport used by the network-backed providers.

use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, Url};
use std::time::Instant;
use uuid::Uuid;

use crate::error::TransportError;
use crate::line_stream::{LineStream, LineStreamExt};

/// Header names whose values are never written to logs.
const REDACTED_HEADERS: [&str; 2] = ["authorization", "x-api-key"];

/// Characters of a response body included in trace logs.
const LOG_SNIPPET_CHARS: usize = 500;

/// A fully built outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpRequest {
    /// A JSON `POST` to `url`.
    pub fn post_json(url: Url, body: impl Into<Bytes>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Self {
            method: Method::POST,
            url,
            headers,
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &'static str, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Headers as printable pairs, with credentials masked.
    pub fn redacted_headers(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .headers
            .iter()
            .map(|(name, value)| {
                let shown = if is_credential_header(name.as_str()) {
                    "***".to_string()
                } else {
                    value.to_str().unwrap_or("<binary>").to_string()
                };
                (name.as_str().to_string(), shown)
            })
            .collect();
        pairs.sort();
        pairs
    }
}

/// A completed response with a 2xx status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Performs HTTP calls on behalf of providers.
///
/// Implementations must be safe to share between concurrent requests. No
/// retries, caching or timeouts are applied at this layer.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send a request and wait for the full body.
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Send a request and return its body as a stream of non-blank lines.
    ///
    /// A non-2xx status fails here, before any line is produced.
    async fn stream_request(&self, request: HttpRequest) -> Result<LineStream, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder().build().map_err(TransportError::network)?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn send(
        &self,
        request: &HttpRequest,
        request_id: Uuid,
    ) -> Result<reqwest::Response, TransportError> {
        log_request(request, request_id);

        self.client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .body(request.body.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(%request_id, url = %request.url, error = %e, "request failed");
                TransportError::network(e)
            })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();

        let response = self.send(&request, request_id).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| {
            tracing::warn!(%request_id, error = %e, "failed reading response body");
            TransportError::network(e)
        })?;

        tracing::debug!(
            %request_id,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "<- response"
        );
        tracing::trace!(%request_id, body = %snippet(&body), "response body");

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body).into_owned();
            tracing::warn!(%request_id, status = status.as_u16(), "non-success status");
            return Err(TransportError::http(status.as_u16(), text));
        }

        Ok(HttpResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }

    async fn stream_request(&self, request: HttpRequest) -> Result<LineStream, TransportError> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();

        let response = self.send(&request, request_id).await?;
        let status = response.status();

        tracing::debug!(
            %request_id,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "<- stream opened"
        );

        if !status.is_success() {
            let body = response.bytes().await.map_err(|e| {
                tracing::warn!(%request_id, error = %e, "failed reading error response body");
                TransportError::network(e)
            })?;
            tracing::warn!(%request_id, status = status.as_u16(), "non-success status");
            return Err(TransportError::http(
                status.as_u16(),
                String::from_utf8_lossy(&body).into_owned(),
            ));
        }

        Ok(response.bytes_stream().lines().boxed())
    }
}

fn log_request(request: &HttpRequest, request_id: Uuid) {
    tracing::debug!(
        %request_id,
        method = %request.method,
        url = %request.url,
        headers = ?request.redacted_headers(),
        "-> request"
    );
    tracing::trace!(%request_id, body = %String::from_utf8_lossy(&request.body), "request body");
}

fn snippet(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .chars()
        .take(LOG_SNIPPET_CHARS)
        .collect()
}

fn is_credential_header(name: &str) -> bool {
    REDACTED_HEADERS
        .iter()
        .any(|header| header.eq_ignore_ascii_case(name))
}
