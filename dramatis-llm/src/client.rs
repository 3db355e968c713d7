//! LLM Client — OpenAI-compatible chat completions (LM Studio, llama.cpp
//! server, hosted APIs) behind the [`TextGenerator`] trait.

use std::future::Future;
use std::time::{Duration, Instant};

use dramatis_core::config::LlmConfig;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::types::{LlmRequest, LlmResponse};

/// Pause before the second attempt; doubled for each attempt after that.
const RETRY_BACKOFF_MS: u64 = 250;

/// Anything that can turn a prompt into text.
///
/// [`LlmClient`] is the production implementation; tests and hosts can
/// plug in scripted or alternative backends.
pub trait TextGenerator {
    /// Generate a completion for `request`.
    fn generate(
        &self,
        request: &LlmRequest,
    ) -> impl Future<Output = Result<LlmResponse, LlmError>> + Send;
}

/// Provider backend for text generation.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    /// OpenAI-compatible chat-completions API. `base_url` includes the
    /// version segment, e.g. `http://localhost:1234/v1`.
    OpenAiCompatible {
        /// API root.
        base_url: String,
        /// Bearer token, if the endpoint needs one.
        api_key: Option<String>,
    },
    /// No backend: every call fails with [`LlmError::Unavailable`].
    None,
}

/// Client that sends chat requests to the configured provider.
pub struct LlmClient {
    provider: LlmProvider,
    http: Client,
    model: String,
    max_retries: u32,
}

impl LlmClient {
    /// Create a new client. `max_retries` counts attempts after the first.
    #[must_use]
    pub fn new(provider: LlmProvider, model: impl Into<String>, max_retries: u32) -> Self {
        Self {
            provider,
            http: Client::new(),
            model: model.into(),
            max_retries,
        }
    }

    /// Build a client from the `[llm]` config section. A blank `base_url`
    /// yields a client with no backend.
    ///
    /// # Errors
    /// Returns `LlmError::ConfigError` if `base_url` is not an `http(s)` URL,
    /// or if `timeout_ms` or `max_tokens` is zero.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        if config.timeout_ms == 0 {
            return Err(LlmError::ConfigError("timeout_ms must be positive".into()));
        }
        if config.max_tokens == 0 {
            return Err(LlmError::ConfigError("max_tokens must be positive".into()));
        }

        let base_url = config.base_url.trim().trim_end_matches('/');
        let provider = if base_url.is_empty() {
            LlmProvider::None
        } else if base_url.starts_with("http://") || base_url.starts_with("https://") {
            LlmProvider::OpenAiCompatible {
                base_url: base_url.to_string(),
                api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
            }
        } else {
            return Err(LlmError::ConfigError(format!(
                "base_url must start with http:// or https://, got '{base_url}'"
            )));
        };
        Ok(Self::new(provider, config.model.clone(), config.max_retries))
    }

    /// Create a client with no backend.
    #[must_use]
    pub fn none() -> Self {
        Self::new(LlmProvider::None, String::new(), 0)
    }

    /// Check if the client has a backend configured.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self.provider, LlmProvider::None)
    }

    /// The model name sent with each request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate using an OpenAI-compatible API.
    async fn generate_openai(
        &self,
        base_url: &str,
        api_key: Option<&str>,
        request: &LlmRequest,
    ) -> Result<LlmResponse, LlmError> {
        let url = format!("{base_url}/chat/completions");
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        let mut last_error = String::new();
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = RETRY_BACKOFF_MS.saturating_mul(1 << (attempt - 1).min(6));
                debug!(
                    attempt = attempt + 1,
                    of = self.max_retries + 1,
                    backoff_ms = backoff,
                    "Retrying chat completion"
                );
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            let start = Instant::now();
            let mut builder = self
                .http
                .post(&url)
                .json(&body)
                .timeout(Duration::from_millis(request.timeout_ms));
            if let Some(key) = api_key {
                builder = builder.bearer_auth(key);
            }
            let result = builder.send().await;
            let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            match result {
                Ok(resp) if resp.status().is_success() => {
                    let json: serde_json::Value = resp
                        .json()
                        .await
                        .map_err(|e| LlmError::from_transport(&e, request.timeout_ms))?;
                    return Ok(read_completion(&json, &self.model, latency_ms));
                }
                Ok(resp) => {
                    let status = resp.status();
                    last_error = format!("HTTP {status}: {}", resp.text().await.unwrap_or_default());
                    warn!(%status, attempt = attempt + 1, "Chat completion returned error");
                }
                Err(e) => {
                    let err = LlmError::from_transport(&e, request.timeout_ms);
                    warn!(error = %err, attempt = attempt + 1, "Chat completion request failed");
                    last_error = err.to_string();
                }
            }
        }

        Err(LlmError::RetriesExhausted {
            attempts: self.max_retries + 1,
            last_error,
        })
    }
}

impl TextGenerator for LlmClient {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        match &self.provider {
            LlmProvider::None => Err(LlmError::Unavailable("No LLM provider configured".into())),
            LlmProvider::OpenAiCompatible { base_url, api_key } => {
                self.generate_openai(base_url, api_key.as_deref(), request)
                    .await
            }
        }
    }
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("available", &self.is_available())
            .field("model", &self.model)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

/// Pull the generated text out of a chat-completions reply.
fn read_completion(json: &serde_json::Value, model: &str, latency_ms: u64) -> LlmResponse {
    let text = json["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    let tokens_generated = json["usage"]["completion_tokens"]
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0);
    let model = json["model"].as_str().unwrap_or(model).to_string();

    LlmResponse {
        text,
        tokens_generated,
        latency_ms,
        model,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn none_provider_is_unavailable() {
        let client = LlmClient::none();
        assert!(!client.is_available());
        let err = client
            .generate(&LlmRequest::new("system", "user"))
            .await
            .expect_err("no backend");
        assert!(matches!(err, LlmError::Unavailable(_)));
    }

    #[test]
    fn from_config_trims_url_and_blank_key() {
        let config = LlmConfig {
            base_url: "http://localhost:1234/v1/".into(),
            api_key: Some("  ".into()),
            ..LlmConfig::default()
        };
        let client = LlmClient::from_config(&config).expect("valid config");
        match &client.provider {
            LlmProvider::OpenAiCompatible { base_url, api_key } => {
                assert_eq!(base_url, "http://localhost:1234/v1");
                assert!(api_key.is_none());
            }
            LlmProvider::None => panic!("expected a backend"),
        }
        assert_eq!(client.model(), "llama-3.2-1b-instruct");
    }

    #[test]
    fn blank_url_means_no_backend() {
        let config = LlmConfig {
            base_url: " ".into(),
            ..LlmConfig::default()
        };
        assert!(!LlmClient::from_config(&config).expect("valid config").is_available());
    }

    #[test]
    fn unusable_settings_are_config_errors() {
        let bad_url = LlmConfig {
            base_url: "localhost:1234/v1".into(),
            ..LlmConfig::default()
        };
        let zero_timeout = LlmConfig {
            timeout_ms: 0,
            ..LlmConfig::default()
        };
        let zero_tokens = LlmConfig {
            max_tokens: 0,
            ..LlmConfig::default()
        };
        for config in [bad_url, zero_timeout, zero_tokens] {
            let err = LlmClient::from_config(&config).expect_err("unusable settings");
            assert!(matches!(err, LlmError::ConfigError(_)), "{err}");
        }
    }

    #[tokio::test]
    async fn unreachable_backend_exhausts_retries_with_classified_error() {
        let config = LlmConfig {
            base_url: "http://127.0.0.1:9/v1".into(),
            max_retries: 0,
            timeout_ms: 500,
            ..LlmConfig::default()
        };
        let client = LlmClient::from_config(&config).expect("valid config");
        let request = LlmRequest::new("system", "user").with_config(&config);
        let err = client.generate(&request).await.expect_err("nothing listening");
        match err {
            LlmError::RetriesExhausted { attempts, last_error } => {
                assert_eq!(attempts, 1);
                assert!(
                    last_error.starts_with("LLM provider unavailable")
                        || last_error == "LLM request timed out after 500ms",
                    "{last_error}"
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn completion_text_and_usage_are_read() {
        let reply = json!({
            "model": "served-model",
            "choices": [{ "message": { "role": "assistant", "content": "{\"characters\": []}" } }],
            "usage": { "completion_tokens": 12 }
        });
        let response = read_completion(&reply, "requested", 40);
        assert_eq!(response.text, "{\"characters\": []}");
        assert_eq!(response.tokens_generated, 12);
        assert_eq!(response.model, "served-model");
        assert_eq!(response.latency_ms, 40);
    }

    #[test]
    fn malformed_completion_degrades_to_empty_text() {
        let response = read_completion(&json!({ "error": "bad" }), "requested", 0);
        assert!(response.text.is_empty());
        assert_eq!(response.model, "requested");
    }
}
