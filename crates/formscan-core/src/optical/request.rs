//! OCR request types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Document;

/// One OCR configuration: layout-analysis mode, language hint and resolution.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(
    name = "OcrConfigurationBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(private, name = "build_inner", error = "OcrConfigurationError")
)]
pub struct OcrConfiguration {
    /// Name used in logs and failure reports.
    pub name: String,
    /// Backend model or analysis mode, e.g. `prebuilt-layout`.
    pub model: String,
    /// Language hint, e.g. `he`.
    #[builder(default)]
    #[serde(default)]
    pub locale: Option<String>,
    /// Optional backend features, e.g. `selectionMarks`.
    #[builder(default)]
    #[serde(default)]
    pub features: Vec<String>,
    /// Whether to request high-resolution analysis.
    #[builder(default)]
    #[serde(default)]
    pub high_resolution: bool,
}

/// Error type for OcrConfiguration builder.
pub type OcrConfigurationError = derive_builder::UninitializedFieldError;

impl OcrConfigurationBuilder {
    /// Build the configuration.
    pub fn build(self) -> Result<OcrConfiguration, OcrConfigurationError> {
        self.build_inner()
    }

    /// Adds a backend feature.
    pub fn add_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.get_or_insert_with(Vec::new).push(feature.into());
        self
    }
}

impl OcrConfiguration {
    /// Creates a configuration with only a name and a model.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            locale: None,
            features: Vec::new(),
            high_resolution: false,
        }
    }

    /// Create a builder for this configuration.
    pub fn builder() -> OcrConfigurationBuilder {
        OcrConfigurationBuilder::default()
    }
}

/// Request to analyze one document with one configuration.
#[derive(Debug, Clone)]
pub struct OcrRequest {
    /// Unique identifier for this request.
    pub request_id: Uuid,
    /// The document to analyze.
    pub document: Document,
    /// Configuration for this attempt.
    pub configuration: OcrConfiguration,
}

impl OcrRequest {
    /// Creates a new request.
    pub fn new(document: Document, configuration: OcrConfiguration) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            document,
            configuration,
        }
    }

    /// Document size in bytes.
    pub fn document_size(&self) -> usize {
        self.document.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let configuration = OcrConfiguration::builder()
            .with_name("layout-he")
            .with_model("prebuilt-layout")
            .with_locale("he")
            .add_feature("selectionMarks")
            .build()
            .unwrap();

        assert_eq!(configuration.locale.as_deref(), Some("he"));
        assert_eq!(configuration.features, vec!["selectionMarks"]);
        assert!(!configuration.high_resolution);
    }

    #[test]
    fn test_builder_requires_model() {
        assert!(OcrConfiguration::builder().with_name("x").build().is_err());
    }

    #[test]
    fn test_deserialize_minimal() {
        let json = r#"{"name": "document", "model": "prebuilt-document"}"#;
        let configuration: OcrConfiguration = serde_json::from_str(json).unwrap();
        assert_eq!(configuration, OcrConfiguration::new("document", "prebuilt-document"));
    }
}
