//! OpenAI-compatible chat completions provider

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use relaychat_contracts::ChatTurn;
use reqwest::{Client, Response};
use serde::Serialize;

use crate::error::{AiError, Result};
use crate::http_client::build_http_client;
use crate::llm::client::{DeltaStream, LlmClient};
use crate::llm::config::LlmConfig;
use crate::llm::sse::decode_event_stream;

// Truncate error body to prevent leaking large or sensitive responses.
const MAX_ERROR_BODY: usize = 512;

/// Client for any `/chat/completions` endpoint speaking the OpenAI streaming
/// protocol (Xunfei MaaS, OpenAI, vLLM, ...).
pub struct OpenAICompatibleClient {
    client: Client,
    config: LlmConfig,
}

impl OpenAICompatibleClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client()?,
            config,
        })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Send the streaming request and return the still unread body.
    pub async fn open_stream(&self, turns: &[ChatTurn]) -> Result<UpstreamBody> {
        let credentials = self.config.credentials()?;

        let body = OpenAIRequest {
            model: &self.config.model,
            messages: turns.iter().map(OpenAIMessage::from).collect(),
            stream: true,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", credentials.base_url))
            .header("Authorization", format!("Bearer {}", credentials.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::Transport(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(response_to_error(response, &self.config.provider_name).await);
        }

        tracing::debug!(
            provider = %self.config.provider_name,
            model = %self.config.model,
            turns = turns.len(),
            "Upstream stream opened"
        );

        Ok(UpstreamBody { response })
    }
}

/// Successful provider response whose body has not been read yet.
///
/// The body can be consumed exactly once.
pub struct UpstreamBody {
    response: Response,
}

impl UpstreamBody {
    pub fn status(&self) -> u16 {
        self.response.status().as_u16()
    }

    pub fn into_byte_stream(
        self,
    ) -> impl Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Send + 'static {
        self.response.bytes_stream()
    }
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    stream: bool,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct OpenAIMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a ChatTurn> for OpenAIMessage<'a> {
    fn from(turn: &'a ChatTurn) -> Self {
        Self {
            role: turn.role.as_str(),
            content: &turn.content,
        }
    }
}

async fn response_to_error(response: Response, provider: &str) -> AiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    let body = if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated]", &body[..end])
    } else {
        body
    };

    AiError::Upstream {
        provider: provider.to_string(),
        status,
        body,
    }
}

#[async_trait]
impl LlmClient for OpenAICompatibleClient {
    fn provider(&self) -> &str {
        &self.config.provider_name
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn stream_completion(&self, turns: Vec<ChatTurn>) -> Result<DeltaStream> {
        let body = self.open_stream(&turns).await?;
        Ok(decode_event_stream(body.into_byte_stream()))
    }
}
