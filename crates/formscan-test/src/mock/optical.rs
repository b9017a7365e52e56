//! Mock OCR provider for testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use formscan_core::types::OcrResult;
use formscan_core::{Context, Error, ErrorKind, OcrRequest, OpticalProvider, Result};
use serde::{Deserialize, Serialize};

/// Scripted outcome for one OCR configuration.
#[derive(Debug, Clone)]
pub enum OcrOutcome {
    /// Return this result.
    Success(OcrResult),
    /// Fail with an error of this kind and message.
    Failure(ErrorKind, String),
    /// Sleep for the given duration, then return the result.
    Stall(Duration, OcrResult),
}

/// Configuration for the mock OCR provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockOpticalConfig {
    /// Text returned for configurations without a scripted outcome.
    pub default_text: String,
}

impl Default for MockOpticalConfig {
    fn default() -> Self {
        Self {
            default_text: "mock ocr text".to_owned(),
        }
    }
}

/// Mock OCR provider for testing.
///
/// Outcomes are scripted per configuration name; unscripted configurations
/// return a text-only result built from [`MockOpticalConfig::default_text`].
#[derive(Debug, Clone, Default)]
pub struct MockOpticalProvider {
    config: MockOpticalConfig,
    outcomes: HashMap<String, OcrOutcome>,
    attempts: Arc<Mutex<Vec<String>>>,
}

impl MockOpticalProvider {
    /// Creates a new mock OCR provider with the given configuration.
    pub fn new(config: MockOpticalConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Scripts the outcome of one configuration.
    pub fn with_outcome(mut self, configuration: impl Into<String>, outcome: OcrOutcome) -> Self {
        self.outcomes.insert(configuration.into(), outcome);
        self
    }

    /// Scripts a successful result for one configuration.
    pub fn succeed(self, configuration: impl Into<String>, result: OcrResult) -> Self {
        self.with_outcome(configuration, OcrOutcome::Success(result))
    }

    /// Scripts a service-unavailable failure for one configuration.
    pub fn fail(self, configuration: impl Into<String>, message: impl Into<String>) -> Self {
        self.with_outcome(
            configuration,
            OcrOutcome::Failure(ErrorKind::ServiceUnavailable, message.into()),
        )
    }

    /// Names of the configurations attempted so far, in call order.
    pub fn attempts(&self) -> Vec<String> {
        self.attempts
            .lock()
            .map(|attempts| attempts.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl OpticalProvider for MockOpticalProvider {
    async fn analyze(&self, _context: &Context, request: &OcrRequest) -> Result<OcrResult> {
        let name = request.configuration.name.clone();
        if let Ok(mut attempts) = self.attempts.lock() {
            attempts.push(name.clone());
        }

        match self.outcomes.get(&name) {
            Some(OcrOutcome::Success(result)) => Ok(result.clone()),
            Some(OcrOutcome::Failure(kind, message)) => {
                Err(Error::new(*kind).with_message(message.clone()))
            }
            Some(OcrOutcome::Stall(delay, result)) => {
                tokio::time::sleep(*delay).await;
                Ok(result.clone())
            }
            None => Ok(OcrResult::from_text(self.config.default_text.clone())),
        }
    }
}
