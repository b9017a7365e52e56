//! Azure AI Document Intelligence as an [`OpticalProvider`].
//!
//! Analysis is a long-running operation: the document is submitted to
//! `documentModels/{model}:analyze`, the service answers `202 Accepted` with
//! an `Operation-Location` header, and that URL is polled until the
//! operation reaches a terminal state.

mod mapping;
mod wire;

use std::fmt;
use std::time::Duration;

use formscan_core::types::OcrResult;
use formscan_core::{Context, OcrConfiguration, OcrRequest, OpticalProvider};
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, warn};
use url::Url;

use self::wire::{AnalyzeOperation, OperationStatus};
use crate::client::read_json;
use crate::{AzClient, AzConfig, Error, Result, TRACING_TARGET_DOCUMENT};

/// Header carrying the Document Intelligence resource key.
const SUBSCRIPTION_KEY_HEADER: &str = "ocp-apim-subscription-key";

/// Header carrying the URL of the submitted operation.
const OPERATION_LOCATION_HEADER: &str = "operation-location";

/// Feature flag requesting high-resolution analysis.
const HIGH_RESOLUTION_FEATURE: &str = "ocrHighResolution";

/// Document Intelligence client implementing [`OpticalProvider`].
#[derive(Clone)]
pub struct DocumentIntelligence {
    client: AzClient,
    api_version: String,
    poll_interval: Duration,
    max_polls: u32,
}

impl DocumentIntelligence {
    /// REST API version used when none is configured.
    pub const DEFAULT_API_VERSION: &'static str = "2024-11-30";
    /// Delay between two status polls.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
    /// Status polls made before an analysis is given up.
    pub const DEFAULT_MAX_POLLS: u32 = 60;

    /// Create a new provider.
    pub fn new(config: AzConfig, api_version: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: AzClient::new(config, SUBSCRIPTION_KEY_HEADER)?,
            api_version: api_version.into(),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            max_polls: Self::DEFAULT_MAX_POLLS,
        })
    }

    /// Set the delay between two status polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set how many status polls are made before giving up.
    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls.max(1);
        self
    }

    /// Longest time spent polling one analysis, excluding the submit call.
    pub fn poll_budget(&self) -> Duration {
        self.poll_interval * self.max_polls
    }

    /// REST API version.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Builds the analyze URL for one configuration.
    pub fn analyze_url(&self, configuration: &OcrConfiguration) -> Url {
        let path = format!(
            "documentintelligence/documentModels/{}:analyze",
            configuration.model
        );

        let mut features = configuration.features.clone();
        if configuration.high_resolution && !features.iter().any(|f| f == HIGH_RESOLUTION_FEATURE)
        {
            features.push(HIGH_RESOLUTION_FEATURE.to_owned());
        }
        let features = features.join(",");

        let mut query = vec![("api-version", self.api_version.as_str())];
        if let Some(locale) = configuration.locale.as_deref() {
            query.push(("locale", locale));
        }
        if !features.is_empty() {
            query.push(("features", features.as_str()));
        }

        self.client.config().url(&path, &query)
    }

    /// Submits the document and returns the operation URL.
    async fn submit(&self, request: &OcrRequest) -> Result<Url> {
        let url = self.analyze_url(&request.configuration);
        let mime_type = request.document.media_kind.mime_type();
        let content = request.document.content.clone();

        debug!(
            target: TRACING_TARGET_DOCUMENT,
            request_id = %request.request_id,
            url = %url,
            size = request.document_size(),
            mime_type,
            "Submitting document for analysis"
        );

        let response = self
            .client
            .execute_with_retry("analyze", |http| {
                http.post(url.clone())
                    .header(CONTENT_TYPE, mime_type)
                    .body(content.clone())
            })
            .await?;

        let location = response
            .headers()
            .get(OPERATION_LOCATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| Error::invalid_response("Missing Operation-Location header", None))?;

        Url::parse(location).map_err(|e| {
            Error::invalid_response(format!("Invalid Operation-Location '{}': {}", location, e), None)
        })
    }

    /// Polls the operation until it reaches a terminal state.
    async fn poll(&self, operation: &Url) -> Result<AnalyzeOperation> {
        for poll in 1..=self.max_polls {
            let response = self
                .client
                .execute_with_retry("poll", |http| http.get(operation.clone()))
                .await?;
            let state: AnalyzeOperation = read_json(response).await?;

            if state.status.is_terminal() {
                debug!(
                    target: TRACING_TARGET_DOCUMENT,
                    polls = poll,
                    status = ?state.status,
                    "Analysis finished"
                );
                return Ok(state);
            }

            if state.status == OperationStatus::Unknown {
                warn!(
                    target: TRACING_TARGET_DOCUMENT,
                    operation = %operation,
                    "Unrecognized operation status, polling again"
                );
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        Err(Error::timeout(self.poll_budget()))
    }

    /// Runs one analysis and maps its result.
    pub async fn analyze_document(&self, request: &OcrRequest) -> Result<OcrResult> {
        let operation = self.submit(request).await?;
        let state = self.poll(&operation).await?;

        match state.status {
            OperationStatus::Succeeded => {
                let result = state.analyze_result.ok_or_else(|| {
                    Error::invalid_response("Succeeded operation has no analyzeResult", None)
                })?;
                Ok(mapping::to_ocr_result(result))
            }
            _ => {
                let error = state.error.unwrap_or_else(|| wire::OperationError {
                    code: format!("{:?}", state.status),
                    message: "operation did not succeed".to_owned(),
                });
                Err(Error::analysis_failed(error.code, error.message))
            }
        }
    }
}

impl fmt::Debug for DocumentIntelligence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentIntelligence")
            .field("endpoint", &self.client.config().endpoint().as_str())
            .field("api_version", &self.api_version)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl OpticalProvider for DocumentIntelligence {
    async fn analyze(
        &self,
        context: &Context,
        request: &OcrRequest,
    ) -> formscan_core::Result<OcrResult> {
        let result = self.analyze_document(request).await?;

        info!(
            target: TRACING_TARGET_DOCUMENT,
            run_id = %context.run_id(),
            configuration = %request.configuration.name,
            tables = result.tables.len(),
            checkboxes = result.checkboxes.len(),
            regions = result.region_confidences.len(),
            "Document analyzed"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> DocumentIntelligence {
        let config = AzConfig::new("https://res.cognitiveservices.azure.com/", "k").unwrap();
        DocumentIntelligence::new(config, DocumentIntelligence::DEFAULT_API_VERSION).unwrap()
    }

    #[test]
    fn test_poll_budget() {
        assert_eq!(provider().poll_budget(), Duration::from_secs(60));

        let provider = provider()
            .with_poll_interval(Duration::from_millis(500))
            .with_max_polls(0);
        assert_eq!(provider.poll_budget(), Duration::from_millis(500));
    }

    #[test]
    fn test_analyze_url_with_locale_and_features() {
        let configuration = OcrConfiguration::builder()
            .with_name("layout-he-marks")
            .with_model("prebuilt-layout")
            .with_locale("he")
            .add_feature("selectionMarks")
            .build()
            .unwrap();

        let url = provider().analyze_url(&configuration);
        assert_eq!(url.path(), "/documentintelligence/documentModels/prebuilt-layout:analyze");

        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            query,
            vec![
                ("api-version".to_owned(), "2024-11-30".to_owned()),
                ("locale".to_owned(), "he".to_owned()),
                ("features".to_owned(), "selectionMarks".to_owned()),
            ]
        );
    }

    #[test]
    fn test_analyze_url_plain() {
        let configuration = OcrConfiguration::new("document", "prebuilt-document");
        let url = provider().analyze_url(&configuration);
        assert_eq!(url.query(), Some("api-version=2024-11-30"));
    }

    #[test]
    fn test_high_resolution_feature() {
        let configuration = OcrConfiguration {
            high_resolution: true,
            ..OcrConfiguration::new("layout", "prebuilt-layout")
        };
        let url = provider().analyze_url(&configuration);
        assert!(
            url.query_pairs()
                .any(|(k, v)| k == "features" && v == "ocrHighResolution")
        );
    }

    #[test]
    fn test_operation_status_parsing() {
        let state: AnalyzeOperation =
            serde_json::from_str(r#"{"status":"running"}"#).unwrap();
        assert!(!state.status.is_terminal());

        let state: AnalyzeOperation = serde_json::from_str(
            r#"{"status":"failed","error":{"code":"InvalidContent","message":"corrupt"}}"#,
        )
        .unwrap();
        assert!(state.status.is_terminal());
        assert_eq!(state.error.unwrap().code, "InvalidContent");

        let state: AnalyzeOperation =
            serde_json::from_str(r#"{"status":"somethingNew"}"#).unwrap();
        assert_eq!(state.status, OperationStatus::Unknown);
    }

    #[test]
    fn test_debug_hides_key() {
        assert!(!format!("{:?}", provider()).contains("\"k\""));
    }
}
