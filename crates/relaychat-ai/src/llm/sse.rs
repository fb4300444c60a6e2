//! Decoder for the provider's `data: {...}` event stream.
//!
//! Bytes arrive in arbitrary fragments. The decoder keeps the unterminated
//! tail between reads and only parses complete lines, so the delta sequence
//! it yields does not depend on where the transport split the body.

use futures::{Stream, StreamExt};
use relaychat_contracts::{DATA_PREFIX, DONE_MARKER};
use serde_json::Value;
use thiserror::Error;

use crate::error::AiError;
use crate::llm::client::DeltaStream;

/// A `data:` line whose payload is not valid JSON.
#[derive(Error, Debug)]
#[error("malformed event payload {payload:?}: {source}")]
pub struct FrameParseError {
    pub payload: String,
    #[source]
    pub source: serde_json::Error,
}

/// Classification of one complete upstream line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamLine {
    /// Blank, not an event, or an event without text.
    Skip,
    /// The provider's own terminal sentinel.
    Done,
    Delta(String),
}

/// Classify a single line of the upstream framing.
pub fn parse_upstream_line(line: &str) -> Result<UpstreamLine, FrameParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(UpstreamLine::Skip);
    }

    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Ok(UpstreamLine::Skip);
    };

    if payload.starts_with(DONE_MARKER) {
        return Ok(UpstreamLine::Done);
    }

    let parsed: Value = serde_json::from_str(payload).map_err(|source| FrameParseError {
        payload: payload.to_string(),
        source,
    })?;

    match parsed
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
    {
        Some(content) if !content.is_empty() => Ok(UpstreamLine::Delta(content.to_string())),
        _ => Ok(UpstreamLine::Skip),
    }
}

/// Incremental line splitter over raw body bytes.
#[derive(Debug, Default)]
pub struct EventStreamDecoder {
    buffer: Vec<u8>,
}

impl EventStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one transport chunk and return the deltas it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut deltas = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(delta) = decode_line(&line) {
                deltas.push(delta);
            }
        }
        deltas
    }

    /// Flush whatever is left once the body has ended.
    ///
    /// A final line without a trailing newline is still parsed; anything that
    /// does not parse is dropped.
    pub fn finish(&mut self) -> Vec<String> {
        let rest = std::mem::take(&mut self.buffer);
        decode_line(&rest).into_iter().collect()
    }
}

fn decode_line(raw: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(raw);
    match parse_upstream_line(&line) {
        Ok(UpstreamLine::Delta(content)) => Some(content),
        Ok(UpstreamLine::Done) => {
            tracing::trace!("Upstream sent its terminal event");
            None
        }
        Ok(UpstreamLine::Skip) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping malformed upstream event");
            None
        }
    }
}

/// Turn a provider body into a [`DeltaStream`].
///
/// A transport failure is yielded once as [`AiError::Transport`] and ends the
/// stream; deltas decoded before it are still delivered.
pub fn decode_event_stream<S, B, E>(byte_stream: S) -> DeltaStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: std::fmt::Display + Send,
{
    Box::pin(async_stream::stream! {
        let mut byte_stream = Box::pin(byte_stream);
        let mut decoder = EventStreamDecoder::new();

        while let Some(chunk_result) = byte_stream.next().await {
            let deltas = match chunk_result {
                Ok(bytes) => decoder.push(bytes.as_ref()),
                Err(e) => {
                    yield Err(AiError::Transport(format!("Stream error: {}", e)));
                    return;
                }
            };

            for delta in deltas {
                yield Ok(delta);
            }
        }

        for delta in decoder.finish() {
            yield Ok(delta);
        }
    })
}
