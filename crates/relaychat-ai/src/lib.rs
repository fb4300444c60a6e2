//! RelayChat AI - streaming LLM provider clients
//!
//! This crate provides:
//! - The `LlmClient` trait: one capability, turn list in, lazy delta stream out
//! - An OpenAI-compatible provider (Xunfei MaaS by default)
//! - The incremental decoder for the provider's event-stream framing

pub mod error;
mod http_client;
pub mod llm;

// Re-export commonly used types
pub use error::{AiError, Result};
pub use llm::{DeltaStream, LlmClient, LlmConfig, OpenAICompatibleClient};
pub use relaychat_contracts::{ChatTurn, Role};
