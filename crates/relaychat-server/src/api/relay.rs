//! Re-encodes provider deltas into the relay's own event framing.
//!
//! Each non-empty delta becomes `data: {"content":"..."}\n\n`. A clean end
//! of the delta stream adds `data: [DONE]\n\n`. A failed delta stream ends
//! with an `Err` item instead and no terminal event, so the HTTP body is cut
//! off and the consumer sees a failed read.

use axum::response::sse::Event;
use futures::{Stream, StreamExt};
use relaychat_ai::{AiError, DeltaStream};
use relaychat_contracts::{DONE_MARKER, RelayFrame};

/// Encode one delta as an outbound event.
pub fn content_event(content: &str) -> Result<Event, AiError> {
    let frame = RelayFrame {
        content: content.to_string(),
    };
    Ok(Event::default().data(serde_json::to_string(&frame)?))
}

/// The terminal event.
pub fn done_event() -> Event {
    Event::default().data(DONE_MARKER)
}

pub fn relay_events(deltas: DeltaStream) -> impl Stream<Item = Result<Event, AiError>> + Send {
    async_stream::stream! {
        let mut deltas = deltas;
        let mut guard = DisconnectGuard::default();

        while let Some(item) = deltas.next().await {
            match item {
                Ok(content) if content.is_empty() => continue,
                Ok(content) => {
                    guard.relayed += 1;
                    yield content_event(&content);
                }
                Err(e) => {
                    tracing::warn!(error = %e, relayed = guard.relayed, "Upstream stream failed mid-relay");
                    guard.finished = true;
                    yield Err(e);
                    return;
                }
            }
        }

        tracing::debug!(deltas = guard.relayed, "Relay stream completed");
        guard.finished = true;
        yield Ok(done_event());
    }
}

/// Notices the body being dropped before the relay finished, which happens
/// when the browser goes away. Dropping the delta stream with it closes the
/// upstream connection.
#[derive(Default)]
struct DisconnectGuard {
    relayed: usize,
    finished: bool,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(
                deltas = self.relayed,
                "Downstream disconnected, closing upstream stream"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::response::{IntoResponse, Sse};
    use futures::stream;

    fn deltas(items: Vec<Result<String, AiError>>) -> DeltaStream {
        Box::pin(stream::iter(items))
    }

    async fn encode(items: Vec<Result<String, AiError>>) -> Result<String, axum::Error> {
        let body = Sse::new(relay_events(deltas(items)))
            .into_response()
            .into_body();
        let bytes = to_bytes(body, usize::MAX).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn test_frames_each_delta_then_done() {
        let out = encode(vec![Ok("Hel".to_string()), Ok("lo".to_string())])
            .await
            .unwrap();

        assert_eq!(
            out,
            "data: {\"content\":\"Hel\"}\n\ndata: {\"content\":\"lo\"}\n\ndata: [DONE]\n\n"
        );
    }

    #[tokio::test]
    async fn test_empty_deltas_are_dropped() {
        let out = encode(vec![Ok(String::new()), Ok("x".to_string()), Ok(String::new())])
            .await
            .unwrap();

        assert_eq!(out, "data: {\"content\":\"x\"}\n\ndata: [DONE]\n\n");
    }

    #[tokio::test]
    async fn test_empty_upstream_still_sends_done() {
        assert_eq!(encode(vec![]).await.unwrap(), "data: [DONE]\n\n");
    }

    #[tokio::test]
    async fn test_content_with_newlines_and_quotes_stays_one_line() {
        let out = encode(vec![Ok("line \"one\"\nline two".to_string())])
            .await
            .unwrap();

        assert_eq!(
            out,
            "data: {\"content\":\"line \\\"one\\\"\\nline two\"}\n\ndata: [DONE]\n\n"
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_errors_body_without_done() {
        let items: Vec<Result<Event, AiError>> = relay_events(deltas(vec![
            Ok("a".to_string()),
            Err(AiError::Transport("reset".to_string())),
            Ok("never".to_string()),
        ]))
        .collect()
        .await;

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(AiError::Transport(_))));

        let body = encode(vec![
            Ok("a".to_string()),
            Err(AiError::Transport("reset".to_string())),
        ])
        .await;
        assert!(body.is_err());
    }
}
