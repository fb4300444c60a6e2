//! Deterministic mock LLM client for relay tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use relaychat_contracts::ChatTurn;
use tokio::time::{Duration, sleep};

use crate::error::{AiError, Result};

use super::{DeltaStream, LlmClient};

/// Scripted outcome of one `stream_completion` call.
#[derive(Debug, Clone)]
pub enum MockScript {
    /// Stream these deltas, then end cleanly.
    Deltas(Vec<String>),
    /// Stream these deltas, then fail with a transport error.
    FailAfter(Vec<String>, String),
    /// Fail before the stream opens with this provider status.
    UpstreamStatus(u16, String),
    /// Fail before the stream opens with a configuration error.
    Misconfigured(String),
}

impl MockScript {
    pub fn deltas<I, S>(deltas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockScript::Deltas(deltas.into_iter().map(Into::into).collect())
    }
}

/// Replays the same script on every call and records the turns it received.
pub struct ScriptedClient {
    script: MockScript,
    delta_delay_ms: u64,
    calls: AtomicUsize,
    received: Mutex<Vec<Vec<ChatTurn>>>,
}

impl ScriptedClient {
    pub fn new(script: MockScript) -> Self {
        Self {
            script,
            delta_delay_ms: 0,
            calls: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before each delta and before a scripted failure.
    pub fn with_delta_delay(mut self, delay_ms: u64) -> Self {
        self.delta_delay_ms = delay_ms;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Turn lists passed to `stream_completion`, in call order.
    pub fn received(&self) -> Vec<Vec<ChatTurn>> {
        self.received
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

fn replay(deltas: Vec<String>, failure: Option<String>, delay_ms: u64) -> DeltaStream {
    Box::pin(async_stream::stream! {
        for delta in deltas {
            if delay_ms > 0 {
                sleep(Duration::from_millis(delay_ms)).await;
            }
            yield Ok(delta);
        }
        if let Some(message) = failure {
            if delay_ms > 0 {
                sleep(Duration::from_millis(delay_ms)).await;
            }
            yield Err(AiError::Transport(message));
        }
    })
}

#[async_trait]
impl LlmClient for ScriptedClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn stream_completion(&self, turns: Vec<ChatTurn>) -> Result<DeltaStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut received) = self.received.lock() {
            received.push(turns);
        }

        match self.script.clone() {
            MockScript::Deltas(deltas) => Ok(replay(deltas, None, self.delta_delay_ms)),
            MockScript::FailAfter(deltas, message) => {
                Ok(replay(deltas, Some(message), self.delta_delay_ms))
            }
            MockScript::UpstreamStatus(status, body) => Err(AiError::Upstream {
                provider: "mock".to_string(),
                status,
                body,
            }),
            MockScript::Misconfigured(message) => Err(AiError::Configuration(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_scripted_deltas_and_recorded_turns() {
        let client = ScriptedClient::new(MockScript::deltas(["a", "b"]));

        let text = client.complete(vec![ChatTurn::user("hi")]).await.unwrap();

        assert_eq!(text, "ab");
        assert_eq!(client.call_count(), 1);
        assert_eq!(client.received(), vec![vec![ChatTurn::user("hi")]]);
    }

    #[tokio::test]
    async fn test_fail_after_yields_error_last() {
        let client = ScriptedClient::new(MockScript::FailAfter(
            vec!["a".to_string()],
            "reset".to_string(),
        ));

        let items: Vec<_> = client
            .stream_completion(vec![])
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Err(AiError::Transport(_))));
    }
}
