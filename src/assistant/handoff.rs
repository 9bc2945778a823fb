/*!
 * Human handoff detection and notification.
 *
 * A message asking for a person is answered with the handoff message and a
 * `HandoffNotifier` is told about it so a human agent can pick it up.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::info;
use reqwest::Client;
use serde::Serialize;
use std::fmt::Debug;
use std::time::Duration;
use uuid::Uuid;

use crate::errors::ProviderError;
use crate::language::{Language, Localized};

const HANDOFF_PHRASES_ES: &[&str] = &[
    "agente humano",
    "persona real",
    "hablar con alguien",
    "hablar con una persona",
    "representante",
    "servicio al cliente",
    "hablar con un humano",
    "hablar con un agente",
];

const HANDOFF_PHRASES_EN: &[&str] = &[
    "human agent",
    "real person",
    "talk to someone",
    "talk to a person",
    "representative",
    "customer service",
    "talk to a human",
    "talk to an agent",
];

/// Recognizes requests to talk to a person
#[derive(Debug, Clone)]
pub struct HandoffDetector {
    phrases: Localized<Vec<String>>,
}

impl Default for HandoffDetector {
    fn default() -> Self {
        let owned = |phrases: &[&str]| phrases.iter().map(|p| p.to_string()).collect();
        Self::new(Localized::new(owned(HANDOFF_PHRASES_ES), owned(HANDOFF_PHRASES_EN)))
    }
}

impl HandoffDetector {
    pub fn new(phrases: Localized<Vec<String>>) -> Self {
        Self { phrases }
    }

    /// Whether `message` contains a handoff phrase of `language`
    pub fn is_handoff_request(&self, message: &str, language: Language) -> bool {
        let message = message.to_lowercase();
        self.phrases
            .get(language)
            .iter()
            .any(|phrase| message.contains(&phrase.to_lowercase()))
    }
}

/// What a human agent needs to pick up a conversation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandoffRequest {
    pub conversation_id: Uuid,
    pub language: Language,
    pub message: String,
    pub requested_at: DateTime<Utc>,
}

impl HandoffRequest {
    pub fn new(conversation_id: Uuid, language: Language, message: impl Into<String>) -> Self {
        Self {
            conversation_id,
            language,
            message: message.into(),
            requested_at: Utc::now(),
        }
    }
}

/// Receives handoff requests
#[async_trait]
pub trait HandoffNotifier: Send + Sync + Debug {
    async fn notify(&self, request: &HandoffRequest) -> Result<(), ProviderError>;
}

/// Notifier that only writes the request to the log
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl HandoffNotifier for LogNotifier {
    async fn notify(&self, request: &HandoffRequest) -> Result<(), ProviderError> {
        info!(
            "Human handoff requested in conversation {} ({}): {}",
            request.conversation_id, request.language, request.message
        );
        Ok(())
    }
}

/// Notifier that posts the request as JSON to a webhook
#[derive(Debug)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl HandoffNotifier for WebhookNotifier {
    async fn notify(&self, request: &HandoffRequest) -> Result<(), ProviderError> {
        let response = self.client.post(&self.url).json(request).send().await?;
        if !response.status().is_success() {
            return Err(crate::providers::error_from_response("Handoff webhook", response).await);
        }
        info!("Handoff for conversation {} sent to webhook", request.conversation_id);
        Ok(())
    }
}
