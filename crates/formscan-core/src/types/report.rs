//! Validation report produced by the scoring stage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Completeness and accuracy assessment of an extracted field mapping.
///
/// Validation findings are always reported as data; producing a report
/// never fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Fraction of required fields that are filled, in `[0, 1]`.
    pub completeness_score: f64,
    /// Human-readable warnings, in the order they were raised.
    #[serde(default)]
    pub accuracy_warnings: Vec<String>,
    /// Fields whose value failed their format rule, in schema order.
    #[serde(default)]
    pub invalid_format_fields: Vec<String>,
    /// Required fields that are null or blank, in schema order.
    #[serde(default)]
    pub empty_fields: Vec<String>,
    /// Mean OCR confidence over all reported regions, in `[0, 1]`.
    pub average_ocr_confidence: f64,
    /// OCR confidence attributed to individual fields.
    #[serde(default)]
    pub field_confidence: BTreeMap<String, f64>,
}

impl ValidationReport {
    /// Returns true if every required field is filled and well-formed.
    pub fn is_clean(&self) -> bool {
        self.empty_fields.is_empty() && self.invalid_format_fields.is_empty()
    }
}
