//! Key-authenticated HTTP client with retry.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::{AzConfig, Error, Result, TRACING_TARGET_CLIENT};

/// HTTP client for one Azure resource.
///
/// Every request carries the resource key in `key_header`. Requests are
/// re-sent on retryable failures with a linear backoff of
/// `retry_backoff * attempt`, or the delay the service asked for.
#[derive(Debug, Clone)]
pub struct AzClient {
    /// HTTP client
    http_client: Client,

    /// Configuration
    config: AzConfig,
}

impl AzClient {
    /// Create a new client that authenticates with `key_header`.
    pub fn new(config: AzConfig, key_header: &'static str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(config.api_key())
            .map_err(|e| Error::config(format!("Invalid API key: {}", e)))?;
        key.set_sensitive(true);
        headers.insert(HeaderName::from_static(key_header), key);

        let http_client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        debug!(
            target: TRACING_TARGET_CLIENT,
            endpoint = %config.endpoint(),
            timeout = ?config.timeout(),
            "Azure client initialized"
        );

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Get a reference to the client configuration.
    pub fn config(&self) -> &AzConfig {
        &self.config
    }

    /// Sends the request produced by `build`, retrying retryable failures.
    ///
    /// `build` is called once per attempt. Returns the first successful
    /// response; non-success statuses are mapped to [`Error`].
    pub async fn execute_with_retry<F>(&self, operation: &str, build: F) -> Result<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut attempt = 0;
        let max_retries = self.config.max_retries();

        loop {
            let result = match build(&self.http_client).send().await {
                Ok(response) => self.handle_response(response).await,
                Err(e) => Err(Error::from(e)),
            };

            match result {
                Ok(response) => {
                    if attempt > 0 {
                        info!(
                            target: TRACING_TARGET_CLIENT,
                            operation,
                            attempt = attempt + 1,
                            "Request succeeded after retry"
                        );
                    }
                    return Ok(response);
                }
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    attempt += 1;
                    let backoff = self.config.retry_backoff() * attempt;
                    let delay = e.retry_after().unwrap_or(backoff);

                    warn!(
                        target: TRACING_TARGET_CLIENT,
                        operation,
                        attempt,
                        max_retries,
                        backoff_ms = delay.as_millis(),
                        error = %e,
                        "Request failed, retrying"
                    );

                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!(
                        target: TRACING_TARGET_CLIENT,
                        operation,
                        attempt = attempt + 1,
                        category = e.category(),
                        error = %e,
                        "Request failed permanently"
                    );
                    return Err(e);
                }
            }
        }
    }

    /// Handle HTTP response, passing successful ones through.
    async fn handle_response(&self, response: Response) -> Result<Response> {
        let status = response.status();

        debug!(
            target: TRACING_TARGET_CLIENT,
            status = status.as_u16(),
            url = %response.url(),
            "Received response from Azure"
        );

        if status.is_success() {
            return Ok(response);
        }

        let headers = response.headers().clone();
        let body = response.text().await.ok();
        Err(status_error(status, &headers, body, self.config.timeout()))
    }
}

/// Reads a JSON response body.
pub(crate) async fn read_json<T>(response: Response) -> Result<T>
where
    T: DeserializeOwned,
{
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        Error::invalid_response(format!("Failed to parse response: {}", e), Some(body))
    })
}

/// Azure error envelope: `{"error": {"code": "...", "message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Maps a non-success status to an error.
fn status_error(
    status: StatusCode,
    headers: &HeaderMap,
    body: Option<String>,
    timeout: Duration,
) -> Error {
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            Error::rate_limit("Rate limit exceeded", retry_after(headers))
        }
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
            Error::service_unavailable("Service temporarily unavailable", retry_after(headers))
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => Error::timeout(timeout),
        _ => match body {
            Some(body) => match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => Error::api(
                    status.as_u16(),
                    envelope
                        .error
                        .message
                        .unwrap_or_else(|| "Unknown error".to_string()),
                    envelope.error.code,
                ),
                Err(_) => Error::api(status.as_u16(), body, None),
            },
            None => Error::api(status.as_u16(), status.to_string(), None),
        },
    }
}

/// Parses a `Retry-After` header given in whole seconds.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
