//! LLM module - streaming provider client abstraction

mod client;
mod config;
#[cfg(any(test, feature = "test-utils"))]
mod mock_client;
mod openai;
pub mod sse;

pub use client::{DeltaStream, LlmClient};
pub use config::{
    Credentials, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_PROVIDER_NAME, DEFAULT_TEMPERATURE,
    LlmConfig,
};
#[cfg(any(test, feature = "test-utils"))]
pub use mock_client::{MockScript, ScriptedClient};
pub use openai::{OpenAICompatibleClient, UpstreamBody};
