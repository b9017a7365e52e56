//! Mock language provider for testing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use formscan_core::{
    CompletionRequest, CompletionResponse, Context, Error, ErrorKind, LanguageProvider, Result,
};
use serde::{Deserialize, Serialize};

/// Scripted outcome for one completion call.
#[derive(Debug, Clone)]
pub enum LanguageOutcome {
    /// Reply with this content.
    Reply(String),
    /// Fail with an error of this kind and message.
    Failure(ErrorKind, String),
    /// Sleep for the given duration, then reply.
    Stall(Duration, String),
}

/// Configuration for the mock language provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockLanguageConfig {
    /// Content returned once the scripted queue is exhausted.
    pub default_reply: String,
}

impl Default for MockLanguageConfig {
    fn default() -> Self {
        Self {
            default_reply: "{}".to_owned(),
        }
    }
}

/// Mock language provider for testing.
///
/// Replays scripted outcomes in order, then falls back to
/// [`MockLanguageConfig::default_reply`].
#[derive(Debug, Clone, Default)]
pub struct MockLanguageProvider {
    config: MockLanguageConfig,
    outcomes: Arc<Mutex<VecDeque<LanguageOutcome>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockLanguageProvider {
    /// Creates a new mock language provider with the given configuration.
    pub fn new(config: MockLanguageConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Appends a scripted outcome.
    pub fn with_outcome(self, outcome: LanguageOutcome) -> Self {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push_back(outcome);
        }
        self
    }

    /// Appends a scripted reply.
    pub fn reply(self, content: impl Into<String>) -> Self {
        self.with_outcome(LanguageOutcome::Reply(content.into()))
    }

    /// Appends a scripted failure.
    pub fn fail(self, kind: ErrorKind, message: impl Into<String>) -> Self {
        self.with_outcome(LanguageOutcome::Failure(kind, message.into()))
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl LanguageProvider for MockLanguageProvider {
    async fn complete(
        &self,
        _context: &Context,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let outcome = self
            .outcomes
            .lock()
            .ok()
            .and_then(|mut outcomes| outcomes.pop_front());

        match outcome {
            Some(LanguageOutcome::Reply(content)) => Ok(request.reply(content)),
            Some(LanguageOutcome::Failure(kind, message)) => {
                Err(Error::new(kind).with_message(message))
            }
            Some(LanguageOutcome::Stall(delay, content)) => {
                tokio::time::sleep(delay).await;
                Ok(request.reply(content))
            }
            None => Ok(request.reply(self.config.default_reply.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_queue_then_default() {
        let provider = MockLanguageProvider::default()
            .fail(ErrorKind::Timeout, "slow")
            .reply(r#"{"a": "b"}"#);
        let context = Context::new();
        let request = CompletionRequest::new("prompt");

        assert!(provider.complete(&context, &request).await.is_err());
        let response = provider.complete(&context, &request).await.unwrap();
        assert_eq!(response.content, r#"{"a": "b"}"#);
        let response = provider.complete(&context, &request).await.unwrap();
        assert_eq!(response.content, "{}");

        assert_eq!(provider.requests().len(), 3);
    }
}
