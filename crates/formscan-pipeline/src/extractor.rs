//! OCR extraction with ordered fallback configurations.

use std::fmt;
use std::sync::Arc;

use formscan_core::types::{Document, OcrResult};
use formscan_core::{Context, OcrRequest, OpticalProvider};
use jiff::Timestamp;

use crate::config::ExtractorConfig;
use crate::{AttemptFailure, Error, Result, TRACING_TARGET_OCR};

/// Runs OCR, falling back through the configured configurations.
#[derive(Clone)]
pub struct OcrExtractor {
    provider: Arc<dyn OpticalProvider>,
    config: ExtractorConfig,
}

impl fmt::Debug for OcrExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrExtractor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OcrExtractor {
    /// Creates a new extractor.
    pub fn new(provider: Arc<dyn OpticalProvider>, config: ExtractorConfig) -> Self {
        Self { provider, config }
    }

    /// Extracts text, tables, checkboxes and confidences from a document.
    ///
    /// Tries each configuration in order and returns the first acceptable
    /// result. A result is acceptable when its text is not blank and, if
    /// `require_regions` is set, it contains at least one table or checkbox.
    /// Fails with [`Error::OcrUnavailable`] only when every configuration
    /// failed or was rejected.
    pub async fn extract(
        &self,
        context: &Context,
        document: &Document,
        require_regions: bool,
    ) -> Result<OcrResult> {
        let timeout = self.config.attempt_timeout();
        let mut attempts = Vec::with_capacity(self.config.configurations.len());

        for configuration in &self.config.configurations {
            let started_at = Timestamp::now();
            let request = OcrRequest::new(document.clone(), configuration.clone());

            tracing::debug!(
                target: TRACING_TARGET_OCR,
                run_id = %context.run_id,
                request_id = %request.request_id,
                configuration = %configuration.name,
                document_size = request.document_size(),
                "Processing OCR request"
            );

            let outcome = tokio::time::timeout(timeout, self.provider.analyze(context, &request))
                .await
                .unwrap_or_else(|_| {
                    Err(formscan_core::Error::timeout()
                        .with_message(format!("no result within {}ms", timeout.as_millis())))
                });
            let elapsed = Timestamp::now().duration_since(started_at);

            let reason = match outcome {
                Err(error) => {
                    tracing::debug!(
                        target: TRACING_TARGET_OCR,
                        run_id = %context.run_id,
                        configuration = %configuration.name,
                        kind = error.kind_str(),
                        retryable = error.is_retryable(),
                        "OCR capability error"
                    );
                    error.to_string()
                }
                Ok(result) => match rejection(&result, require_regions) {
                    None => {
                        tracing::info!(
                            target: TRACING_TARGET_OCR,
                            run_id = %context.run_id,
                            configuration = %configuration.name,
                            tables = result.tables.len(),
                            checkboxes = result.checkboxes.len(),
                            regions = result.region_confidences.len(),
                            elapsed_ms = elapsed.as_millis(),
                            "OCR configuration accepted"
                        );

                        return Ok(OcrResult {
                            configuration: Some(configuration.name.clone()),
                            ..result
                        });
                    }
                    Some(reason) => reason.to_owned(),
                },
            };

            tracing::warn!(
                target: TRACING_TARGET_OCR,
                run_id = %context.run_id,
                configuration = %configuration.name,
                reason = %reason,
                elapsed_ms = elapsed.as_millis(),
                "OCR configuration failed"
            );
            attempts.push(AttemptFailure::new(&configuration.name, reason));
        }

        tracing::error!(
            target: TRACING_TARGET_OCR,
            run_id = %context.run_id,
            attempts = attempts.len(),
            "Every OCR configuration failed"
        );

        Err(Error::OcrUnavailable { attempts })
    }
}

/// Returns why a result is not acceptable, or `None` if it is.
fn rejection(result: &OcrResult, require_regions: bool) -> Option<&'static str> {
    if !result.has_text() {
        Some("no text recognized")
    } else if require_regions && !result.has_regions() {
        Some("no tables or checkboxes detected")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use formscan_core::{ErrorKind, OcrConfiguration};
    use formscan_test::{MockOpticalProvider, OcrOutcome, fixtures};

    use super::*;

    fn config(names: &[&str]) -> ExtractorConfig {
        ExtractorConfig {
            configurations: names
                .iter()
                .map(|name| OcrConfiguration::new(*name, "prebuilt-layout"))
                .collect(),
            attempt_timeout_ms: 200,
        }
    }

    fn extractor(provider: &MockOpticalProvider, names: &[&str]) -> OcrExtractor {
        OcrExtractor::new(Arc::new(provider.clone()), config(names))
    }

    #[tokio::test]
    async fn test_falls_back_to_third_configuration() {
        let provider = MockOpticalProvider::default()
            .fail("a", "model not available")
            .with_outcome("b", OcrOutcome::Failure(ErrorKind::Timeout, "slow".into()))
            .succeed("c", fixtures::english_ocr_result());

        let result = extractor(&provider, &["a", "b", "c"])
            .extract(&Context::new(), &fixtures::pdf_document(), true)
            .await
            .unwrap();

        assert_eq!(result.configuration.as_deref(), Some("c"));
        assert_eq!(result.raw_text, fixtures::ENGLISH_FORM_TEXT);
        assert_eq!(provider.attempts(), ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_all_failing_lists_every_attempt() {
        let provider = MockOpticalProvider::default()
            .fail("a", "boom")
            .fail("b", "boom")
            .fail("c", "boom");

        let error = extractor(&provider, &["a", "b", "c"])
            .extract(&Context::new(), &fixtures::pdf_document(), false)
            .await
            .unwrap_err();

        let attempts = error.ocr_attempts().unwrap();
        let names: Vec<_> = attempts.iter().map(|a| a.configuration.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert!(attempts.iter().all(|a| a.reason.contains("boom")));
    }

    #[tokio::test]
    async fn test_rejects_results_without_required_regions() {
        let provider = MockOpticalProvider::default()
            .succeed("a", OcrResult::from_text("text only"))
            .succeed("b", OcrResult::from_text("   "))
            .succeed("c", OcrResult::from_text("text").with_checkbox("male", true));

        let result = extractor(&provider, &["a", "b", "c"])
            .extract(&Context::new(), &fixtures::pdf_document(), true)
            .await
            .unwrap();
        assert_eq!(result.configuration.as_deref(), Some("c"));

        let result = extractor(&provider, &["a", "b", "c"])
            .extract(&Context::new(), &fixtures::pdf_document(), false)
            .await
            .unwrap();
        assert_eq!(result.configuration.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failed_attempt() {
        let provider = MockOpticalProvider::default()
            .with_outcome(
                "slow",
                OcrOutcome::Stall(Duration::from_secs(5), fixtures::english_ocr_result()),
            )
            .succeed("fast", fixtures::english_ocr_result());

        let result = extractor(&provider, &["slow", "fast"])
            .extract(&Context::new(), &fixtures::pdf_document(), true)
            .await
            .unwrap();
        assert_eq!(result.configuration.as_deref(), Some("fast"));

        let error = extractor(&provider, &["slow"])
            .extract(&Context::new(), &fixtures::pdf_document(), true)
            .await
            .unwrap_err();
        assert_eq!(
            error.ocr_attempts().unwrap()[0].reason,
            "Timeout: no result within 200ms"
        );
    }

    #[tokio::test]
    async fn test_confidences_pass_through() {
        let expected = fixtures::english_ocr_result();
        let provider = MockOpticalProvider::default().succeed("a", expected.clone());

        let result = extractor(&provider, &["a"])
            .extract(&Context::new(), &fixtures::pdf_document(), true)
            .await
            .unwrap();
        assert_eq!(result.region_confidences, expected.region_confidences);
    }

    #[tokio::test]
    async fn test_empty_configuration_list() {
        let provider = MockOpticalProvider::default();
        let error = extractor(&provider, &[])
            .extract(&Context::new(), &fixtures::pdf_document(), false)
            .await
            .unwrap_err();
        assert_eq!(error.ocr_attempts().map(<[_]>::len), Some(0));
    }
}
