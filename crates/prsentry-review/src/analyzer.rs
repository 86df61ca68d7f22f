use std::time::Duration;

use async_trait::async_trait;
use prsentry_core::{AnalyzerConfig, SentryError};

/// The analysis seam: a composed prompt in, raw model text out.
#[async_trait]
pub trait ReviewAnalyzer {
    async fn analyze(&self, prompt: &str) -> Result<String, SentryError>;
}

/// Anthropic messages API client.
///
/// # Examples
///
/// ```
/// use prsentry_core::AnalyzerConfig;
/// use prsentry_review::analyzer::ClaudeClient;
///
/// let config = AnalyzerConfig {
///     api_key: "sk-test".into(),
///     model: "claude-3-sonnet-20240229".into(),
///     base_url: "https://api.anthropic.com".into(),
///     max_tokens: 4096,
/// };
/// let client = ClaudeClient::new(&config).unwrap();
/// assert_eq!(client.model(), "claude-3-sonnet-20240229");
/// ```
pub struct ClaudeClient {
    http: reqwest::Client,
    config: AnalyzerConfig,
}

const ANTHROPIC_VERSION: &str = "2023-06-01";

impl ClaudeClient {
    /// Create a new analyzer client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SentryError::Analyzer`] if the HTTP client cannot be built.
    pub fn new(config: &AnalyzerConfig) -> Result<Self, SentryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| SentryError::Analyzer(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// Return the model name from the configuration.
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl ReviewAnalyzer for ClaudeClient {
    async fn analyze(&self, prompt: &str) -> Result<String, SentryError> {
        let url = format!("{}/v1/messages", self.config.base_url);

        let body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| SentryError::Analyzer(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(SentryError::Analyzer(format!(
                "analyzer API error {status}: {body_text}"
            )));
        }

        let response_body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SentryError::Analyzer(format!("failed to parse response: {e}")))?;

        let content = response_body
            .get("content")
            .and_then(|c| c.get(0))
            .and_then(|block| block.get("text"))
            .and_then(|t| t.as_str())
            .ok_or(SentryError::EmptyAnalysis)?;

        if content.trim().is_empty() {
            return Err(SentryError::EmptyAnalysis);
        }

        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AnalyzerConfig {
        AnalyzerConfig {
            api_key: "sk-test".into(),
            model: "claude-3-sonnet-20240229".into(),
            base_url: "https://api.anthropic.com".into(),
            max_tokens: 4096,
        }
    }

    #[test]
    fn client_construction_succeeds() {
        assert!(ClaudeClient::new(&config()).is_ok());
    }

    #[test]
    fn model_returns_config_model() {
        let client = ClaudeClient::new(&config()).unwrap();
        assert_eq!(client.model(), "claude-3-sonnet-20240229");
    }
}
