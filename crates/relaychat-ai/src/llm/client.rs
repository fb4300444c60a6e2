//! LLM client trait and types

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use relaychat_contracts::ChatTurn;

use crate::error::Result;

/// Lazy, single-pass sequence of text deltas in arrival order.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// LLM client trait
///
/// A provider only has to turn a list of turns into a [`DeltaStream`]; the
/// relay never sees provider-specific framing.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Get provider name
    fn provider(&self) -> &str;

    /// Get model name
    fn model(&self) -> &str;

    /// Open a streaming completion for `turns`.
    ///
    /// Every failure that happens before the first byte of output (missing
    /// configuration, connect errors, non-success status) is returned here.
    /// Errors after that point arrive as an `Err` item inside the stream.
    async fn stream_completion(&self, turns: Vec<ChatTurn>) -> Result<DeltaStream>;

    /// Run a completion to the end and return the concatenated text.
    async fn complete(&self, turns: Vec<ChatTurn>) -> Result<String> {
        let mut stream = self.stream_completion(turns).await?;
        let mut content = String::new();
        while let Some(delta) = stream.next().await {
            content.push_str(&delta?);
        }
        Ok(content)
    }
}
