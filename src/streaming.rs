//! Server-Sent Events decoding shared by the streaming providers.

use futures_util::stream::{self, Stream, StreamExt};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::line_stream::LineStream;
use crate::Error;

/// Ordered text fragments of a streamed answer.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, Error>> + Send>>;

/// Prefix every meaningful SSE line starts with.
pub const DATA_PREFIX: &str = "data: ";

/// Payload that ends an OpenAI-style stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// The payload of an SSE line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseLine<'a> {
    /// `data: [DONE]`
    Done,
    /// Anything else after `data: `.
    Data(&'a str),
}

impl<'a> SseLine<'a> {
    /// Parse one raw line. Lines without the `data: ` prefix yield `None`.
    pub fn parse(line: &'a str) -> Option<Self> {
        let payload = line.strip_prefix(DATA_PREFIX)?;
        if payload == DONE_SENTINEL {
            Some(SseLine::Done)
        } else {
            Some(SseLine::Data(payload))
        }
    }
}

/// What a vendor decoder made of one JSON event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventAction {
    /// Text to hand to the caller.
    Emit(String),
    /// Valid event with nothing to deliver.
    Skip,
    /// Authoritative end of the stream.
    Stop,
}

/// Decodes one vendor JSON payload.
pub type EventDecoder = fn(&str) -> Result<EventAction, serde_json::Error>;

/// Counts SSE payloads that could not be decoded.
///
/// Malformed events never fail a stream; this counter is the only trace of them
/// besides the debug log.
#[derive(Debug, Clone, Default)]
pub struct SkipCounter(Arc<AtomicU64>);

impl SkipCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

enum Step {
    Emit(String),
    Skip,
    Stop,
    Fail(Error),
}

/// Turn raw SSE lines into text fragments.
///
/// Lines are pulled one at a time; once a terminator is seen or an error is
/// returned the underlying line stream is dropped.
pub fn decode_sse(
    lines: LineStream,
    provider: &'static str,
    decode: EventDecoder,
    skipped: SkipCounter,
) -> FragmentStream {
    let steps = lines.map(move |line| match line {
        Err(e) => Step::Fail(e.into()),
        Ok(line) => decode_line(&line, provider, decode, &skipped),
    });

    stream::unfold(Some(steps), |state| async move {
        let mut steps = state?;
        loop {
            match steps.next().await? {
                Step::Emit(text) => return Some((Ok(text), Some(steps))),
                Step::Skip => continue,
                Step::Stop => return None,
                Step::Fail(e) => return Some((Err(e), None)),
            }
        }
    })
    .boxed()
}

fn decode_line(line: &str, provider: &str, decode: EventDecoder, skipped: &SkipCounter) -> Step {
    let payload = match SseLine::parse(line) {
        None => {
            tracing::debug!(provider, line, "ignoring non-data SSE line");
            return Step::Skip;
        }
        Some(SseLine::Done) => return Step::Stop,
        Some(SseLine::Data(payload)) => payload,
    };

    match decode(payload) {
        Ok(EventAction::Emit(text)) => Step::Emit(text),
        Ok(EventAction::Skip) => Step::Skip,
        Ok(EventAction::Stop) => Step::Stop,
        Err(e) => {
            skipped.increment();
            tracing::debug!(provider, error = %e, payload, "skipping undecodable SSE event");
            Step::Skip
        }
    }
}
