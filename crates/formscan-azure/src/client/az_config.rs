//! Connection settings shared by the Azure adapters.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::{Error, Result};

/// Connection settings for one Azure resource.
///
/// # Examples
///
/// ```ignore
/// use formscan_azure::AzConfig;
/// use std::time::Duration;
///
/// let config = AzConfig::new("https://my-resource.cognitiveservices.azure.com", "key")?
///     .with_timeout(Duration::from_secs(60))
///     .with_max_retries(5);
/// ```
#[derive(Clone)]
pub struct AzConfig {
    /// Resource endpoint
    endpoint: Url,

    /// Resource key
    api_key: String,

    /// Request timeout duration
    timeout: Duration,

    /// Maximum number of retry attempts for retryable errors
    max_retries: u32,

    /// Base delay for linear backoff
    retry_backoff: Duration,

    /// User agent string for HTTP requests
    user_agent: String,
}

impl AzConfig {
    /// Create a new configuration with the given endpoint and key.
    pub fn new(endpoint: impl AsRef<str>, api_key: impl Into<String>) -> Result<Self> {
        let endpoint = Url::parse(endpoint.as_ref()).map_err(|e| {
            Error::config(format!("Invalid endpoint '{}': {}", endpoint.as_ref(), e))
        })?;

        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::config(format!("Missing key for endpoint '{}'", endpoint)));
        }

        Ok(Self {
            endpoint,
            api_key,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
            user_agent: format!("formscan-azure/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Get the resource endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Get the resource key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the maximum number of retry attempts.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Get the retry backoff duration.
    pub fn retry_backoff(&self) -> Duration {
        self.retry_backoff
    }

    /// Get the user agent string.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the retry backoff duration.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Builds `{endpoint}/{path}?{query}`, keeping any path prefix of the endpoint.
    pub fn url(&self, path: &str, query: &[(&str, &str)]) -> Url {
        let mut url = self.endpoint.clone();
        let prefix = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{}/{}", prefix, path.trim_start_matches('/')));
        url.set_query(None);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }
}

impl fmt::Debug for AzConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff", &self.retry_backoff)
            .finish_non_exhaustive()
    }
}
