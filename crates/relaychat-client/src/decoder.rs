//! Decoder for the relay's `data: {"content": ...}` framing.

use relaychat_contracts::{DATA_PREFIX, DONE_MARKER, RelayFrame};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    Content(String),
    /// Terminal marker. Reading continues until the body ends.
    Done,
}

/// Classify one line of relay output; `None` for lines that carry nothing.
pub fn parse_relay_line(line: &str) -> Option<RelayEvent> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let payload = line.strip_prefix(DATA_PREFIX)?;

    if payload == DONE_MARKER {
        return Some(RelayEvent::Done);
    }

    match serde_json::from_str::<RelayFrame>(payload) {
        Ok(frame) => Some(RelayEvent::Content(frame.content)),
        Err(e) => {
            tracing::warn!(error = %e, payload, "Skipping malformed relay event");
            None
        }
    }
}

/// Buffers partial lines across reads.
#[derive(Debug, Default)]
pub struct RelayDecoder {
    buffer: Vec<u8>,
}

impl RelayDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<RelayEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]);
            events.extend(parse_relay_line(&line));
        }
        events
    }

    /// Parse a final line that was not newline terminated.
    pub fn finish(&mut self) -> Vec<RelayEvent> {
        let rest = std::mem::take(&mut self.buffer);
        parse_relay_line(&String::from_utf8_lossy(&rest))
            .into_iter()
            .collect()
    }
}
