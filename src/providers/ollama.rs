use anyhow::Context;
use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{error_from_response, ChatMessage, Provider};
use crate::errors::ProviderError;

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Model used by `test_connection`
    model: String,
}

/// Generation options for the Ollama API
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// Model name to use for generation
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    stream: bool,
}

/// Chat response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Model name
    pub model: String,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: String,
    /// Response message
    pub message: ChatMessage,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

impl ChatRequest {
    /// Create a new non-streaming chat request
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: None,
            stream: false,
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).temperature = Some(temperature);
        self
    }

    /// Cap the number of generated tokens
    pub fn num_predict(mut self, num_predict: u32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).num_predict = Some(num_predict);
        self
    }
}

/// Rebuild a chat response from a JSONL stream of partial messages.
///
/// Servers sometimes stream even when asked not to; the message pieces are
/// concatenated and the token counts are taken from the final `done` line.
fn parse_streamed_chat(response_text: &str) -> Option<ChatResponse> {
    let lines: Vec<serde_json::Value> = response_text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();
    let last = lines.last()?;

    let content: String = lines
        .iter()
        .filter_map(|value| value.get("message")?.get("content")?.as_str())
        .collect();
    let final_line = lines
        .iter()
        .rev()
        .find(|value| value.get("done").and_then(|v| v.as_bool()).unwrap_or(false))
        .unwrap_or(last);

    Some(ChatResponse {
        model: final_line.get("model").and_then(|v| v.as_str()).unwrap_or("unknown").to_string(),
        created_at: final_line.get("created_at").and_then(|v| v.as_str()).unwrap_or("").to_string(),
        message: ChatMessage::new("assistant", content),
        done: true,
        prompt_eval_count: final_line.get("prompt_eval_count").and_then(|v| v.as_u64()),
        eval_count: final_line.get("eval_count").and_then(|v| v.as_u64()),
    })
}

impl Ollama {
    /// Create a new Ollama client from a complete URL
    pub fn from_url(url: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: url.into().trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                // Ollama uses HTTP/1.1
                .http1_only()
                .build()
                .unwrap_or_default(),
            model: model.into(),
        }
    }

    /// Get the Ollama API version
    pub async fn version(&self) -> anyhow::Result<String> {
        let url = format!("{}/api/version", self.base_url);
        let response: serde_json::Value = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to connect to Ollama")?
            .json()
            .await
            .context("Failed to parse Ollama version response")?;

        let version = response["version"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid version format in response"))?
            .to_string();

        Ok(version)
    }
}

#[async_trait]
impl Provider for Ollama {
    type Request = ChatRequest;
    type Response = ChatResponse;

    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);
        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(error_from_response("Ollama", response).await);
        }

        let response_text = response.text().await?;
        match serde_json::from_str::<ChatResponse>(&response_text) {
            Ok(chat_response) => Ok(chat_response),
            Err(e) => {
                error!(
                    "Failed to parse Ollama chat response: {}. Raw response (first 500 chars): {}",
                    e,
                    response_text.chars().take(500).collect::<String>()
                );
                parse_streamed_chat(&response_text).ok_or_else(|| {
                    ProviderError::ParseError(format!("Response contains invalid JSON: {}", e))
                })
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.version()
            .await
            .map(|_| ())
            .map_err(|e| ProviderError::ConnectionError(format!("{:#}", e)))?;
        let request = ChatRequest::new(self.model.clone(), vec![ChatMessage::new("user", "Hello")]).num_predict(10);
        self.complete(request).await?;
        Ok(())
    }

    fn extract_text(response: &ChatResponse) -> String {
        response.message.content.trim().to_string()
    }
}
