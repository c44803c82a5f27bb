//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use futures::channel::mpsc;
use futures::StreamExt;
use prompt_gateway::line_stream::LineStream;
use prompt_gateway::{HttpRequest, HttpResponse, Transport, TransportError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

enum Reply {
    Body { status: u16, body: String },
    Lines(Vec<String>),
    Channel(Mutex<Option<mpsc::UnboundedReceiver<Result<String, TransportError>>>>),
}

/// A [`Transport`] answering every call with a canned reply and recording
/// what it was asked.
pub struct FakeTransport {
    calls: AtomicUsize,
    requests: Mutex<Vec<HttpRequest>>,
    reply: Reply,
}

impl FakeTransport {
    fn with_reply(reply: Reply) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            reply,
        }
    }

    /// Answer with `status` and `body`; non-2xx statuses fail like a real transport.
    pub fn body(status: u16, body: impl Into<String>) -> Self {
        Self::with_reply(Reply::Body {
            status,
            body: body.into(),
        })
    }

    pub fn json(body: serde_json::Value) -> Self {
        Self::body(200, body.to_string())
    }

    /// Stream these raw lines, blank ones dropped as the real transport does.
    pub fn lines(lines: &[&str]) -> Self {
        Self::with_reply(Reply::Lines(
            lines
                .iter()
                .filter(|line| !line.trim().is_empty())
                .map(|line| line.to_string())
                .collect(),
        ))
    }

    /// Stream whatever the returned sender pushes, for as long as it is open.
    pub fn channel() -> (Self, mpsc::UnboundedSender<Result<String, TransportError>>) {
        let (tx, rx) = mpsc::unbounded();
        (
            Self::with_reply(Reply::Channel(Mutex::new(Some(rx)))),
            tx,
        )
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was recorded")
    }

    pub fn last_body(&self) -> serde_json::Value {
        serde_json::from_slice(&self.last_request().body).expect("request body is not JSON")
    }

    fn record(&self, request: HttpRequest) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
    }
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.record(request);
        match &self.reply {
            Reply::Body { status, body } if (200..300).contains(status) => Ok(HttpResponse {
                status: *status,
                headers: Default::default(),
                body: body.clone().into(),
            }),
            Reply::Body { status, body } => Err(TransportError::http(*status, body.clone())),
            _ => panic!("FakeTransport configured for streaming only"),
        }
    }

    async fn stream_request(&self, request: HttpRequest) -> Result<LineStream, TransportError> {
        self.record(request);
        match &self.reply {
            Reply::Body { status, body } if !(200..300).contains(status) => {
                Err(TransportError::http(*status, body.clone()))
            }
            Reply::Body { .. } => panic!("FakeTransport configured for a plain body only"),
            Reply::Lines(lines) => {
                let items: Vec<Result<String, TransportError>> =
                    lines.iter().cloned().map(Ok).collect();
                Ok(futures::stream::iter(items).boxed())
            }
            Reply::Channel(rx) => {
                let rx = rx.lock().unwrap().take().expect("channel already consumed");
                Ok(rx.boxed())
            }
        }
    }
}
