/*!
 * LLM fallback.
 *
 * `ChatBackend` is the seam the assistant talks to. `LlmService` implements it
 * on top of the configured provider client, sending the persona as system
 * prompt plus the recent conversation, with a per-attempt timeout and
 * exponential backoff between retryable failures.
 */

use async_trait::async_trait;
use log::{debug, error, warn};
use std::fmt::Debug;
use std::time::Duration;

use super::conversation::{Role, Turn};
use crate::app_config::{LlmCommonConfig, LlmConfig, LlmProvider};
use crate::errors::ProviderError;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::ollama::{ChatRequest, Ollama};
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::providers::{ChatMessage, Provider};

/// Generates a free-form reply from a persona and recent turns
#[async_trait]
pub trait ChatBackend: Send + Sync + Debug {
    async fn reply(&self, system_prompt: &str, history: &[Turn]) -> Result<String, ProviderError>;
}

// @enum: Configured provider client
#[derive(Debug)]
enum LlmClient {
    OpenAI { client: OpenAI },
    Anthropic { client: Anthropic },
    Ollama { client: Ollama },
}

/// `ChatBackend` backed by a provider HTTP client
#[derive(Debug)]
pub struct LlmService {
    client: LlmClient,
    model: String,
    common: LlmCommonConfig,
    timeout_secs: u64,
}

impl LlmService {
    /// Build the service for the active provider.
    ///
    /// Returns `None` when the LLM is disabled or a hosted provider has no API
    /// key; the assistant then runs without the LLM step.
    pub fn from_config(config: &LlmConfig) -> Option<Self> {
        if !config.enabled {
            debug!("LLM fallback disabled in configuration");
            return None;
        }
        if !config.is_usable() {
            warn!(
                "No API key configured for {}; running without the LLM fallback",
                config.provider.display_name()
            );
            return None;
        }

        let model = config.get_model();
        let endpoint = config.get_endpoint();
        let timeout_secs = config.get_timeout_secs();
        let client = match config.provider {
            LlmProvider::OpenAI | LlmProvider::LMStudio => LlmClient::OpenAI {
                client: OpenAI::new(config.get_api_key(), endpoint, model.clone(), timeout_secs),
            },
            LlmProvider::Anthropic => LlmClient::Anthropic {
                client: Anthropic::new(config.get_api_key(), endpoint, model.clone(), timeout_secs),
            },
            LlmProvider::Ollama => LlmClient::Ollama {
                client: Ollama::from_url(endpoint, model.clone(), timeout_secs),
            },
        };

        Some(Self {
            client,
            model,
            common: config.common.clone(),
            timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Check the provider is reachable
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        match &self.client {
            LlmClient::OpenAI { client } => client.test_connection().await,
            LlmClient::Anthropic { client } => client.test_connection().await,
            LlmClient::Ollama { client } => client.test_connection().await,
        }
    }

    async fn complete_once(&self, system_prompt: &str, history: &[Turn]) -> Result<String, ProviderError> {
        let temperature = self.common.temperature;
        let max_tokens = self.common.max_tokens;

        match &self.client {
            LlmClient::OpenAI { client } => {
                let request = history
                    .iter()
                    .fold(
                        OpenAIRequest::new(self.model.clone()).add_message(Role::System.as_str(), system_prompt),
                        |request, turn| request.add_message(turn.role.as_str(), turn.content.clone()),
                    )
                    .temperature(temperature)
                    .max_tokens(max_tokens);
                let response = client.complete(request).await?;
                Ok(OpenAI::extract_text(&response))
            }
            LlmClient::Anthropic { client } => {
                // The messages API takes the system prompt separately and only user/assistant turns
                let request = history
                    .iter()
                    .filter(|turn| turn.role != Role::System)
                    .fold(
                        AnthropicRequest::new(self.model.clone(), max_tokens).system(system_prompt),
                        |request, turn| request.add_message(turn.role.as_str(), turn.content.clone()),
                    )
                    .temperature(temperature);
                let response = client.complete(request).await?;
                Ok(Anthropic::extract_text(&response))
            }
            LlmClient::Ollama { client } => {
                let messages = std::iter::once(ChatMessage::new(Role::System.as_str(), system_prompt))
                    .chain(history.iter().map(|turn| ChatMessage::new(turn.role.as_str(), turn.content.clone())))
                    .collect();
                let request = ChatRequest::new(self.model.clone(), messages)
                    .temperature(temperature)
                    .num_predict(max_tokens);
                let response = client.complete(request).await?;
                Ok(Ollama::extract_text(&response))
            }
        }
    }
}

/// Run `attempt_fn` up to `retry_count + 1` times.
///
/// Each attempt is bounded by `timeout`; retryable errors wait
/// `backoff_base_ms * 2^(attempt - 1)` before the next attempt.
pub async fn with_retries<F, Fut>(
    retry_count: u32,
    backoff_base_ms: u64,
    timeout: Duration,
    mut attempt_fn: F,
) -> Result<String, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<String, ProviderError>>,
{
    let mut attempt = 0;

    loop {
        let result = match tokio::time::timeout(timeout, attempt_fn()).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(timeout.as_secs())),
        };

        match result {
            Ok(text) => return Ok(text),
            Err(e) if e.is_retryable() && attempt < retry_count => {
                attempt += 1;
                let backoff_ms = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(16));
                warn!(
                    "LLM request failed: {} - retrying in {}ms (attempt {}/{})",
                    e,
                    backoff_ms,
                    attempt + 1,
                    retry_count + 1
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
            Err(e) => {
                error!("LLM request failed after {} attempt(s): {}", attempt + 1, e);
                return Err(e);
            }
        }
    }
}

#[async_trait]
impl ChatBackend for LlmService {
    async fn reply(&self, system_prompt: &str, history: &[Turn]) -> Result<String, ProviderError> {
        let text = with_retries(
            self.common.retry_count,
            self.common.retry_backoff_ms,
            Duration::from_secs(self.timeout_secs),
            || self.complete_once(system_prompt, history),
        )
        .await?;

        if text.trim().is_empty() {
            return Err(ProviderError::ParseError("Empty completion".to_string()));
        }
        Ok(text)
    }
}
