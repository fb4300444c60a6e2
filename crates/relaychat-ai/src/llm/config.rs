use serde::Deserialize;

use crate::error::{AiError, Result};

pub const DEFAULT_PROVIDER_NAME: &str = "Xunfei";
pub const DEFAULT_MODEL: &str = "xop3qwen1b7";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Provider settings injected once at process start.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    /// Human readable provider label, used in error messages.
    pub provider_name: String,
    /// Base URL of the completions API, without the `/chat/completions` suffix.
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider_name: DEFAULT_PROVIDER_NAME.to_string(),
            base_url: None,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Endpoint and key that passed validation.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub base_url: &'a str,
    pub api_key: &'a str,
}

impl LlmConfig {
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Fails when either the key or the base URL is absent or blank.
    pub fn credentials(&self) -> Result<Credentials<'_>> {
        let base_url = non_blank(self.base_url.as_deref());
        let api_key = non_blank(self.api_key.as_deref());

        match (base_url, api_key) {
            (Some(base_url), Some(api_key)) => Ok(Credentials {
                base_url: base_url.trim_end_matches('/'),
                api_key,
            }),
            _ => Err(AiError::Configuration(format!(
                "Missing {} API credentials",
                self.provider_name
            ))),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LlmConfig::default();
        assert_eq!(config.model, "xop3qwen1b7");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 2048);
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let config = LlmConfig::default().with_base_url("https://example.test/v1");
        let err = config.credentials().unwrap_err();

        assert!(matches!(err, AiError::Configuration(_)));
        assert_eq!(err.to_string(), "Missing Xunfei API credentials");
    }

    #[test]
    fn test_blank_url_is_configuration_error() {
        let config = LlmConfig::default().with_api_key("sk").with_base_url("   ");
        assert!(matches!(
            config.credentials(),
            Err(AiError::Configuration(_))
        ));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = LlmConfig::default()
            .with_api_key("sk")
            .with_base_url("https://example.test/v1/");
        let creds = config.credentials().unwrap();
        assert_eq!(creds.base_url, "https://example.test/v1");
        assert_eq!(creds.api_key, "sk");
    }
}
