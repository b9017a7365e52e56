//! Pipeline tuning knobs.
//!
//! Every section has defaults; a JSON file only needs to name the values it
//! overrides.

use std::path::Path;
use std::time::Duration;

use formscan_core::OcrConfiguration;
use serde::{Deserialize, Serialize};

use crate::rules::FormatRules;
use crate::{Error, Result};

/// Settings of the OCR extraction stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Configurations to try, in order.
    pub configurations: Vec<OcrConfiguration>,
    /// Per-attempt timeout in milliseconds.
    ///
    /// Covers the provider's whole analysis, so it should exceed the
    /// provider's own polling budget by the time a submit can take.
    pub attempt_timeout_ms: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            configurations: default_configurations(),
            attempt_timeout_ms: 180_000,
        }
    }
}

impl ExtractorConfig {
    /// Per-attempt timeout.
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }
}

/// Layout analysis with Hebrew locale and selection marks first, then
/// progressively less demanding configurations.
fn default_configurations() -> Vec<OcrConfiguration> {
    let layout_he = OcrConfiguration {
        locale: Some("he".to_owned()),
        ..OcrConfiguration::new("layout-he", "prebuilt-layout")
    };
    let layout_he_marks = OcrConfiguration {
        name: "layout-he-marks".to_owned(),
        features: vec!["selectionMarks".to_owned()],
        ..layout_he.clone()
    };

    vec![
        layout_he_marks,
        layout_he,
        OcrConfiguration::new("layout", "prebuilt-layout"),
        OcrConfiguration::new("document", "prebuilt-document"),
    ]
}

/// Settings of the interpretation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Per-call timeout in milliseconds.
    pub timeout_ms: u64,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 60_000,
            max_tokens: 2_000,
            temperature: 0.0,
        }
    }
}

impl InterpreterConfig {
    /// Per-call timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Settings of the validation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Completeness below this raises an aggregate warning.
    pub low_completeness_threshold: f64,
    /// Average OCR confidence below this raises an aggregate warning.
    pub low_confidence_threshold: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            low_completeness_threshold: 0.5,
            low_confidence_threshold: 0.5,
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// OCR extraction settings.
    pub extractor: ExtractorConfig,
    /// Interpretation settings.
    pub interpreter: InterpreterConfig,
    /// Validation settings.
    pub validator: ValidatorConfig,
    /// Format and correction rules shared by interpretation and validation.
    pub rules: FormatRules,
}

impl PipelineConfig {
    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration from a JSON file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.extractor.attempt_timeout_ms == 0 {
            return Err(Error::config("extractor.attempt_timeout_ms must be positive"));
        }
        if self.interpreter.timeout_ms == 0 {
            return Err(Error::config("interpreter.timeout_ms must be positive"));
        }

        for (name, threshold) in [
            ("low_completeness_threshold", self.validator.low_completeness_threshold),
            ("low_confidence_threshold", self.validator.low_confidence_threshold),
        ] {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(Error::config(format!(
                    "validator.{} must be within [0, 1], got {}",
                    name, threshold
                )));
            }
        }

        self.rules.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration_order() {
        let config = ExtractorConfig::default();
        let names: Vec<_> = config.configurations.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["layout-he-marks", "layout-he", "layout", "document"]);
        assert_eq!(config.configurations[0].features, ["selectionMarks"]);
        assert_eq!(config.configurations[1].locale.as_deref(), Some("he"));
        assert!(config.configurations[1].features.is_empty());
        assert_eq!(config.configurations[3].model, "prebuilt-document");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PipelineConfig::from_json(
            r#"{"interpreter": {"timeout_ms": 5000}, "validator": {"low_confidence_threshold": 0.7}}"#,
        )
        .unwrap();

        assert_eq!(config.interpreter.timeout(), Duration::from_secs(5));
        assert_eq!(config.interpreter.max_tokens, 2_000);
        assert_eq!(config.validator.low_confidence_threshold, 0.7);
        assert_eq!(config.validator.low_completeness_threshold, 0.5);
        assert_eq!(config.extractor, ExtractorConfig::default());
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let result = PipelineConfig::from_json(r#"{"validator": {"low_completeness_threshold": 2.0}}"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        tokio::fs::write(&path, r#"{"extractor": {"attempt_timeout_ms": 1000, "configurations": [{"name": "only", "model": "prebuilt-read"}]}}"#)
            .await
            .unwrap();

        let config = PipelineConfig::from_file(&path).await.unwrap();
        assert_eq!(config.extractor.configurations.len(), 1);
        assert_eq!(config.extractor.attempt_timeout(), Duration::from_secs(1));

        let missing = PipelineConfig::from_file(dir.path().join("missing.json")).await;
        assert!(matches!(missing, Err(Error::Config(_))));
    }
}
