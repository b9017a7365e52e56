//! Pipeline error types.

use std::fmt;

use formscan_core::BoxedError;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, IntoStaticStr};

/// Result type for all pipeline operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Pipeline stage a fatal failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    /// Reading the input document.
    Input,
    /// Resolving the form schema.
    Schema,
    /// Optical character recognition.
    Ocr,
    /// Field interpretation.
    Interpretation,
}

/// One failed OCR configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptFailure {
    /// Name of the configuration that was tried.
    pub configuration: String,
    /// Why the attempt failed.
    pub reason: String,
}

impl AttemptFailure {
    /// Creates a new attempt failure.
    pub fn new(configuration: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            configuration: configuration.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.configuration, self.reason)
    }
}

/// Errors raised by the extraction pipeline.
///
/// Validation findings are never errors; they are reported in the
/// `ValidationReport`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Every OCR configuration failed or was rejected.
    #[error("OCR unavailable after {} attempt(s): {}", .attempts.len(), join_attempts(.attempts))]
    OcrUnavailable {
        /// Every attempted configuration with its failure reason, in order.
        attempts: Vec<AttemptFailure>,
    },

    /// The model reply could not be mapped onto the schema.
    #[error("Interpretation failed: {reason}")]
    InterpretationFailed {
        /// Why the last attempt failed.
        reason: String,
        /// Raw reply of the last attempt, when one was received.
        raw_response: Option<String>,
    },

    /// A stage of the pipeline failed.
    #[error("Pipeline failed at {stage} stage: {cause}")]
    PipelineFailed {
        /// Stage that failed.
        stage: Stage,
        /// Underlying failure.
        #[source]
        cause: BoxedError,
    },

    /// A schema could not be loaded or is invalid.
    #[error("Schema error ({origin}): {message}")]
    Schema {
        /// Where the schema came from: a file path or `builtin`.
        origin: String,
        /// Description of the problem.
        message: String,
    },

    /// The pipeline configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

fn join_attempts(attempts: &[AttemptFailure]) -> String {
    if attempts.is_empty() {
        return "no configurations".to_owned();
    }

    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Create a schema error.
    pub fn schema(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Wraps a failure with the stage it happened in.
    pub fn at_stage(stage: Stage, cause: impl Into<BoxedError>) -> Self {
        Self::PipelineFailed {
            stage,
            cause: cause.into(),
        }
    }

    /// Returns the failed stage, if this is a stage failure.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::PipelineFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Returns the innermost pipeline error of a stage failure, or `self`.
    pub fn root(&self) -> &Error {
        match self {
            Error::PipelineFailed { cause, .. } => {
                cause.downcast_ref::<Error>().map_or(self, Error::root)
            }
            _ => self,
        }
    }

    /// Returns the OCR attempts, if OCR was unavailable.
    pub fn ocr_attempts(&self) -> Option<&[AttemptFailure]> {
        match self.root() {
            Error::OcrUnavailable { attempts } => Some(attempts),
            _ => None,
        }
    }

    /// Get the error category for metrics/logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::OcrUnavailable { .. } => "ocr_unavailable",
            Error::InterpretationFailed { .. } => "interpretation_failed",
            Error::PipelineFailed { .. } => "pipeline_failed",
            Error::Schema { .. } => "schema",
            Error::Config(_) => "config",
        }
    }
}
