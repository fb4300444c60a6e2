//! Turn lifecycle: submit, stream deltas into the assistant message, settle.

use std::fmt::Display;

use futures::{Stream, StreamExt};

use crate::decoder::{RelayDecoder, RelayEvent};
use crate::error::{ClientError, Result};
use crate::renderer::MessageRenderer;
use crate::session::{ApologyPlacement, ChatSession};
use crate::transport::RelayClient;

#[derive(Debug)]
pub enum TurnOutcome {
    /// Blank input, or a turn is already in flight.
    Rejected,
    Completed { assistant_id: String },
    Failed { error: ClientError, apology_id: String },
}

/// Submit `input` and render the reply as it streams in.
pub async fn send_message(
    session: &mut ChatSession,
    client: &RelayClient,
    renderer: &mut dyn MessageRenderer,
    input: &str,
) -> TurnOutcome {
    let Some(turn) = session.begin_turn(input) else {
        return TurnOutcome::Rejected;
    };

    for id in [&turn.user_id, &turn.assistant_id] {
        if let Some(message) = session.message(id) {
            renderer.message_appended(message);
        }
    }
    renderer.loading_changed(true);

    let result = match client.open(&turn.request).await {
        Ok(stream) => consume_relay_stream(stream, session, &turn.assistant_id, renderer).await,
        Err(e) => Err(e),
    };

    let outcome = match result {
        Ok(deltas) => {
            tracing::debug!(deltas, "Turn completed");
            TurnOutcome::Completed {
                assistant_id: turn.assistant_id,
            }
        }
        Err(error) => {
            tracing::warn!(error = %error, "Turn failed");
            let apology_id = match session.fail_turn(&turn.assistant_id) {
                ApologyPlacement::Filled(id) => {
                    if let Some(message) = session.message(&id) {
                        renderer.message_updated(message);
                    }
                    id
                }
                ApologyPlacement::Appended(id) => {
                    if let Some(message) = session.message(&id) {
                        renderer.message_appended(message);
                    }
                    id
                }
            };
            TurnOutcome::Failed { error, apology_id }
        }
    };

    session.finish_turn();
    renderer.loading_changed(false);
    outcome
}

/// Feed relay bytes into the assistant message until the body ends.
///
/// Returns the number of content events applied. `[DONE]` does not stop the
/// loop; only the end of the stream does.
pub async fn consume_relay_stream<S, B, E>(
    stream: S,
    session: &mut ChatSession,
    assistant_id: &str,
    renderer: &mut dyn MessageRenderer,
) -> Result<usize>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut stream = std::pin::pin!(stream);
    let mut decoder = RelayDecoder::new();
    let mut applied = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ClientError::Transport(e.to_string()))?;
        for event in decoder.push(chunk.as_ref()) {
            applied += apply_event(event, session, assistant_id, renderer);
        }
    }
    for event in decoder.finish() {
        applied += apply_event(event, session, assistant_id, renderer);
    }

    Ok(applied)
}

fn apply_event(
    event: RelayEvent,
    session: &mut ChatSession,
    assistant_id: &str,
    renderer: &mut dyn MessageRenderer,
) -> usize {
    match event {
        RelayEvent::Content(text) => match session.append_delta(assistant_id, &text) {
            Some(message) => {
                renderer.message_updated(message);
                1
            }
            None => 0,
        },
        RelayEvent::Done => {
            tracing::trace!("Relay sent its terminal event");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::RenderedMessage;
    use futures::stream;

    #[derive(Default)]
    struct Recorder {
        snapshots: Vec<String>,
    }

    impl MessageRenderer for Recorder {
        fn message_appended(&mut self, _message: &RenderedMessage) {}

        fn message_updated(&mut self, message: &RenderedMessage) {
            self.snapshots.push(message.content.clone());
        }
    }

    fn chunks(parts: &[&str]) -> Vec<std::result::Result<Vec<u8>, String>> {
        parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect()
    }

    #[tokio::test]
    async fn test_deltas_accumulate_progressively() {
        let mut session = ChatSession::new();
        let turn = session.begin_turn("hi").unwrap();
        let mut renderer = Recorder::default();

        let body = chunks(&[
            "data: {\"content\":\"Hel\"}\n\nda",
            "ta: {\"content\":\"lo\"}\n\n",
            "data: [DONE]\n\n",
        ]);
        let applied = consume_relay_stream(
            stream::iter(body),
            &mut session,
            &turn.assistant_id,
            &mut renderer,
        )
        .await
        .unwrap();

        assert_eq!(applied, 2);
        assert_eq!(renderer.snapshots, vec!["Hel", "Hello"]);
        assert_eq!(session.message(&turn.assistant_id).unwrap().content, "Hello");
    }

    #[tokio::test]
    async fn test_transport_error_keeps_partial_content() {
        let mut session = ChatSession::new();
        let turn = session.begin_turn("hi").unwrap();

        let body = vec![
            Ok(b"data: {\"content\":\"par\"}\n\n".to_vec()),
            Err("connection reset".to_string()),
        ];
        let result = consume_relay_stream(
            stream::iter(body),
            &mut session,
            &turn.assistant_id,
            &mut crate::renderer::NullRenderer,
        )
        .await;

        assert!(matches!(result, Err(ClientError::Transport(_))));
        assert_eq!(session.message(&turn.assistant_id).unwrap().content, "par");
    }
}
