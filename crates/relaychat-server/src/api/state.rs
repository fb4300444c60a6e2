use relaychat_ai::LlmClient;
use std::sync::Arc;

/// Application state shared across all API handlers
///
/// Holds no per-request data; every chat request is self-contained.
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<dyn LlmClient>,
}

impl AppState {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}
