//! Error type of the Azure adapters.

use std::time::Duration;

use formscan_core::ErrorKind;

/// Result type for all Azure operations in this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure modes when talking to Azure services.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP client errors (connection, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
        /// Optional error code from the API
        code: Option<String>,
    },

    /// Invalid or malformed API response
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Description of what's invalid
        message: String,
        /// Optional raw response body for debugging
        body: Option<String>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Request timeout
    #[error("Request timed out after {timeout:?}")]
    Timeout {
        /// Duration before timeout occurred
        timeout: Duration,
    },

    /// Rate limiting errors
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        /// Details about the rate limit violation
        message: String,
        /// Time until rate limit resets (if known)
        retry_after: Option<Duration>,
    },

    /// Service unavailable
    #[error("Service unavailable: {message}")]
    ServiceUnavailable {
        /// Description of the unavailability
        message: String,
        /// Optional retry delay suggestion
        retry_after: Option<Duration>,
    },

    /// A long-running analysis finished with a failed status
    #[error("Analysis failed ({code}): {message}")]
    AnalysisFailed {
        /// Error code reported by the operation
        code: String,
        /// Error message reported by the operation
        message: String,
    },
}

impl Error {
    /// Create an API error
    pub fn api(status: u16, message: impl Into<String>, code: Option<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            code,
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(message: impl Into<String>, body: Option<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
            body,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(timeout: Duration) -> Self {
        Self::Timeout { timeout }
    }

    /// Create a rate limit error
    pub fn rate_limit(message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    /// Create a service unavailable error
    pub fn service_unavailable(message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
            retry_after,
        }
    }

    /// Create an analysis failure
    pub fn analysis_failed(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AnalysisFailed {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Check if this error indicates a temporary failure that might succeed on retry
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Timeout { .. } | Error::RateLimit { .. } | Error::ServiceUnavailable { .. } => {
                true
            }

            Error::Http(err) => err.is_timeout() || err.is_connect() || err.is_request(),

            Error::Api { status, .. } => matches!(*status, 429 | 500..=599),

            Error::Serialization(_)
            | Error::Config { .. }
            | Error::InvalidResponse { .. }
            | Error::AnalysisFailed { .. } => false,
        }
    }

    /// Get the HTTP status code if this is an HTTP/API error
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Get the retry delay if this error provides one
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::RateLimit { retry_after, .. }
            | Error::ServiceUnavailable { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::Http(_) => "http",
            Error::Api { .. } => "api",
            Error::InvalidResponse { .. } => "invalid_response",
            Error::Serialization(_) => "serialization",
            Error::Config { .. } => "config",
            Error::Timeout { .. } => "timeout",
            Error::RateLimit { .. } => "rate_limit",
            Error::ServiceUnavailable { .. } => "service_unavailable",
            Error::AnalysisFailed { .. } => "analysis_failed",
        }
    }

    /// Capability error kind this error is reported as.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Http(err) if err.is_timeout() => ErrorKind::Timeout,
            Error::Http(_) => ErrorKind::NetworkError,
            Error::Api { status: 401 | 403, .. } => ErrorKind::Authentication,
            Error::Api { status: 429, .. } => ErrorKind::RateLimited,
            Error::Api {
                status: 400..=499, ..
            } => ErrorKind::InvalidInput,
            Error::Api { .. } | Error::InvalidResponse { .. } | Error::AnalysisFailed { .. } => {
                ErrorKind::ExternalError
            }
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::Config { .. } => ErrorKind::Configuration,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::RateLimit { .. } => ErrorKind::RateLimited,
            Error::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
        }
    }
}

impl From<Error> for formscan_core::Error {
    fn from(error: Error) -> Self {
        let message = error.to_string();
        formscan_core::Error::new(error.kind())
            .with_message(message)
            .with_source(error)
    }
}
