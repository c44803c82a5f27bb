//! Stream adapter splitting a chunked byte stream into text lines.

use futures_util::{Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use crate::error::TransportError;

/// Longest line accepted before the stream is aborted.
pub const MAX_LINE_BYTES: usize = 1_048_576;

/// A stream of non-blank lines read from an HTTP body.
pub type LineStream = Pin<Box<dyn Stream<Item = Result<String, TransportError>> + Send>>;

/// Splits raw byte chunks on `\n`, keeping partial lines across chunks.
///
/// Blank lines are dropped and a trailing `\r` is stripped. A line that is not
/// valid UTF-8 is skipped with a warning. After the first error the stream is
/// finished.
pub struct LineSplitter<S> {
    inner: S,
    /// Bytes of a line that has not seen its terminator yet
    buffer: Vec<u8>,
    lines: VecDeque<String>,
    /// Reported once the lines queued before it have been drained
    pending_error: Option<TransportError>,
    finished: bool,
}

impl<S> LineSplitter<S> {
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            buffer: Vec::new(),
            lines: VecDeque::new(),
            pending_error: None,
            finished: false,
        }
    }

    fn push_line(&mut self, raw: &[u8]) {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        if raw.iter().all(u8::is_ascii_whitespace) {
            return;
        }
        match std::str::from_utf8(raw) {
            Ok(line) => self.lines.push_back(line.to_string()),
            Err(e) => tracing::warn!(error = %e, "skipping line with invalid UTF-8"),
        }
    }

    fn split_buffer(&mut self) {
        let mut start = 0;
        while let Some(pos) = memchr::memchr(b'\n', &self.buffer[start..]) {
            let end = start + pos;
            let line = self.buffer[start..end].to_vec();
            self.push_line(&line);
            start = end + 1;
        }
        if start > 0 {
            self.buffer.drain(..start);
        }
    }
}

impl<S, E> Stream for LineSplitter<S>
where
    S: Stream<Item = Result<bytes::Bytes, E>> + Unpin,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Item = Result<String, TransportError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(line) = self.lines.pop_front() {
                return Poll::Ready(Some(Ok(line)));
            }
            if let Some(err) = self.pending_error.take() {
                return Poll::Ready(Some(Err(err)));
            }
            if self.finished {
                return Poll::Ready(None);
            }

            let chunk = match ready!(self.inner.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    self.finished = true;
                    self.buffer.clear();
                    return Poll::Ready(Some(Err(TransportError::Network(e.into()))));
                }
                None => {
                    // Body ended without a final newline
                    self.finished = true;
                    let rest = std::mem::take(&mut self.buffer);
                    self.push_line(&rest);
                    continue;
                }
            };

            self.buffer.extend_from_slice(&chunk);
            self.split_buffer();

            if self.buffer.len() > MAX_LINE_BYTES {
                self.finished = true;
                self.buffer.clear();
                self.pending_error = Some(TransportError::network(format!(
                    "line exceeded {MAX_LINE_BYTES} bytes"
                )));
            }
        }
    }
}

/// Extension trait to split byte streams into lines.
pub trait LineStreamExt: Stream {
    fn lines(self) -> LineSplitter<Self>
    where
        Self: Sized,
    {
        LineSplitter::new(self)
    }
}

impl<S: Stream> LineStreamExt for S {}
