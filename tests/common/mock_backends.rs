/*!
 * Mock LLM backend and handoff notifier for testing
 *
 * Both record what they were given so tests can assert on the pipeline
 * without any external calls.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use tixobot::assistant::{ChatBackend, HandoffNotifier, HandoffRequest, Turn};
use tixobot::errors::ProviderError;

/// Behavior of the mock backend
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Always answers with the given text
    Reply(String),
    /// Answers with the given text after a delay
    Slow(String, Duration),
    /// Always fails with a connection error
    Failing,
}

/// What the backend was called with
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub history: Vec<Turn>,
}

#[derive(Debug)]
pub struct MockChatBackend {
    behavior: MockBehavior,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockChatBackend {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            behavior: MockBehavior::Reply(text.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn replying_after(text: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            behavior: MockBehavior::Slow(text.to_string(), delay),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            behavior: MockBehavior::Failing,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ChatBackend for MockChatBackend {
    async fn reply(&self, system_prompt: &str, history: &[Turn]) -> Result<String, ProviderError> {
        self.calls.lock().push(RecordedCall {
            system_prompt: system_prompt.to_string(),
            history: history.to_vec(),
        });
        match &self.behavior {
            MockBehavior::Reply(text) => Ok(text.clone()),
            MockBehavior::Slow(text, delay) => {
                tokio::time::sleep(*delay).await;
                Ok(text.clone())
            }
            MockBehavior::Failing => Err(ProviderError::ConnectionError("mock backend down".to_string())),
        }
    }
}

/// Notifier that keeps every request, optionally failing afterwards
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    requests: Mutex<Vec<HandoffRequest>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn requests(&self) -> Vec<HandoffRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl HandoffNotifier for RecordingNotifier {
    async fn notify(&self, request: &HandoffRequest) -> Result<(), ProviderError> {
        self.requests.lock().push(request.clone());
        if self.fail {
            return Err(ProviderError::ApiError {
                status_code: 500,
                message: "webhook down".to_string(),
            });
        }
        Ok(())
    }
}
