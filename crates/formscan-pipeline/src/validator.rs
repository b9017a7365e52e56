//! Deterministic completeness and format scoring.

use std::collections::BTreeMap;

use formscan_core::types::{FieldMapping, FieldSpec, FieldType, OcrResult, Schema, ValidationReport};

use crate::config::ValidatorConfig;
use crate::rules::{FormatRules, parse_date};
use crate::TRACING_TARGET_VALIDATOR;

/// Scores an interpreted field mapping.
///
/// Validation never fails: every finding is reported in the
/// [`ValidationReport`].
#[derive(Debug, Clone, Default)]
pub struct FieldValidator {
    config: ValidatorConfig,
    rules: FormatRules,
}

impl FieldValidator {
    /// Creates a new validator.
    pub fn new(config: ValidatorConfig, rules: FormatRules) -> Self {
        Self { config, rules }
    }

    /// Computes completeness, format findings and OCR confidence.
    pub fn validate(
        &self,
        fields: &FieldMapping,
        schema: &Schema,
        ocr: &OcrResult,
    ) -> ValidationReport {
        let mut report = ValidationReport::default();

        let mut required = 0usize;
        let mut filled = 0usize;
        for field in schema.fields() {
            let value = fields.value(&field.name);

            if field.required {
                required += 1;
                if value.is_some() {
                    filled += 1;
                } else {
                    report.empty_fields.push(field.name.clone());
                    report
                        .accuracy_warnings
                        .push(format!("Required field '{}' is empty", field.name));
                }
            }

            if let Some(value) = value
                && let Some(problem) = self.format_problem(field, value)
            {
                report.invalid_format_fields.push(field.name.clone());
                report.accuracy_warnings.push(format!(
                    "Field '{}' has an invalid {} value '{}': {}",
                    field.name, field.field_type, value, problem
                ));
            }
        }

        report.completeness_score = if required == 0 {
            1.0
        } else {
            filled as f64 / required as f64
        };
        report.average_ocr_confidence = average_confidence(ocr);
        report.field_confidence = fields
            .iter()
            .filter_map(|(name, value)| value.confidence.map(|c| (name.to_owned(), c)))
            .collect::<BTreeMap<_, _>>();

        if report.completeness_score < self.config.low_completeness_threshold {
            report.accuracy_warnings.push(format!(
                "Low completeness: {:.0}% of required fields are filled",
                report.completeness_score * 100.0
            ));
        }
        if report.average_ocr_confidence < self.config.low_confidence_threshold {
            report.accuracy_warnings.push(format!(
                "Low OCR confidence: average {:.2}",
                report.average_ocr_confidence
            ));
        }

        tracing::debug!(
            target: TRACING_TARGET_VALIDATOR,
            completeness = report.completeness_score,
            confidence = report.average_ocr_confidence,
            empty = report.empty_fields.len(),
            invalid = report.invalid_format_fields.len(),
            "Validation finished"
        );

        report
    }

    /// Describes why `value` breaks the field's format rule, if it does.
    fn format_problem(&self, field: &FieldSpec, value: &str) -> Option<String> {
        let value = value.trim();
        match &field.field_type {
            FieldType::String => None,
            FieldType::IdNumber => (!self.rules.is_valid_id(value)).then(|| {
                format!("expected {} digits", join_lengths(&self.rules.id_lengths))
            }),
            FieldType::Phone => (!self.rules.is_valid_phone(value))
                .then(|| "does not match any known phone number pattern".to_owned()),
            FieldType::Date => parse_date(value)
                .is_none()
                .then(|| "not a real calendar date in D/M/Y, M/D/Y or Y-M-D form".to_owned()),
            FieldType::EnumChoice { choices } => {
                let known = choices
                    .iter()
                    .any(|choice| choice.trim().to_lowercase() == value.to_lowercase());
                (!known).then(|| format!("expected one of: {}", choices.join(", ")))
            }
        }
    }
}

fn join_lengths(lengths: &[usize]) -> String {
    let lengths: Vec<String> = lengths.iter().map(ToString::to_string).collect();
    match lengths.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {}", rest.join(", "), last),
        _ => lengths.join(""),
    }
}

/// Mean region confidence clamped to `[0, 1]`; zero when nothing was reported.
fn average_confidence(ocr: &OcrResult) -> f64 {
    let confidences: Vec<f64> = ocr
        .region_confidences
        .iter()
        .map(|region| region.confidence)
        .filter(|confidence| confidence.is_finite())
        .collect();

    if confidences.is_empty() {
        return 0.0;
    }

    let mean = confidences.iter().sum::<f64>() / confidences.len() as f64;
    mean.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use formscan_core::types::{FormLanguage, RegionConfidence};
    use formscan_test::fixtures;

    use super::*;

    fn validator() -> FieldValidator {
        FieldValidator::default()
    }

    fn ocr_with_confidence(confidence: f64) -> OcrResult {
        OcrResult::from_text("text").with_region(RegionConfidence::new("p1:w0", "text", confidence))
    }

    fn filled_english() -> FieldMapping {
        let schema = fixtures::english_schema();
        let mut fields = FieldMapping::for_schema(&schema);
        for (name, value) in [
            ("lastName", "Cohen"),
            ("idNumber", "123456782"),
            ("mobilePhone", "0501234567"),
            ("dateOfBirth", "02/03/1985"),
            ("gender", "female"),
        ] {
            fields.set(name, Some(value.to_owned()));
        }
        fields
    }

    #[test]
    fn test_complete_mapping_scores_one() {
        let schema = fixtures::english_schema();
        let report = validator().validate(&filled_english(), &schema, &ocr_with_confidence(0.9));

        assert_eq!(report.completeness_score, 1.0);
        assert!(report.empty_fields.is_empty());
        assert!(report.invalid_format_fields.is_empty());
        assert!(report.accuracy_warnings.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn test_all_null_mapping() {
        let schema = fixtures::english_schema();
        let fields = FieldMapping::for_schema(&schema);
        let report = validator().validate(&fields, &schema, &ocr_with_confidence(0.9));

        let required: Vec<_> = schema.required_fields().map(|f| f.name.clone()).collect();
        assert_eq!(report.completeness_score, 0.0);
        assert_eq!(report.empty_fields, required);
        assert!(report.invalid_format_fields.is_empty());
    }

    #[test]
    fn test_completeness_is_bounded() {
        let schema = fixtures::english_schema();
        let mut fields = filled_english();
        fields.set("gender", None);
        fields.set("lastName", Some("   ".into()));

        let report = validator().validate(&fields, &schema, &OcrResult::default());
        assert!((0.0..1.0).contains(&report.completeness_score));
        assert_eq!(report.completeness_score, 3.0 / 5.0);
        assert_eq!(report.empty_fields, ["lastName", "gender"]);
    }

    #[test]
    fn test_no_required_fields_is_complete() {
        let schema = Schema::new(
            FormLanguage::English,
            vec![FieldSpec::optional("note", FieldType::String)],
        )
        .unwrap();
        let fields = FieldMapping::for_schema(&schema);
        let report = validator().validate(&fields, &schema, &ocr_with_confidence(0.9));
        assert_eq!(report.completeness_score, 1.0);
    }

    #[test]
    fn test_format_rules() {
        let schema = fixtures::english_schema();
        let mut fields = filled_english();
        fields.set("idNumber", Some("12345".into()));
        fields.set("mobilePhone", Some("8501234567".into()));
        fields.set("dateOfBirth", Some("31/02/1985".into()));
        fields.set("gender", Some("other".into()));
        fields.set("poBox", Some("anything".into()));

        let report = validator().validate(&fields, &schema, &ocr_with_confidence(0.9));
        assert_eq!(
            report.invalid_format_fields,
            ["idNumber", "mobilePhone", "dateOfBirth", "gender"]
        );
        assert!(report.empty_fields.is_empty());
        assert_eq!(report.completeness_score, 1.0);
        assert!(report.accuracy_warnings[0].contains("expected 9 or 10 digits"));
    }

    #[test]
    fn test_enum_match_is_case_insensitive() {
        let schema = fixtures::english_schema();
        let mut fields = filled_english();
        fields.set("gender", Some(" Female ".into()));
        let report = validator().validate(&fields, &schema, &ocr_with_confidence(0.9));
        assert!(report.invalid_format_fields.is_empty());
    }

    #[test]
    fn test_low_completeness_only_aggregate() {
        let fields: Vec<_> = (0..10)
            .map(|i| FieldSpec::required(format!("field{i}"), FieldType::String))
            .collect();
        let schema = Schema::new(FormLanguage::English, fields).unwrap();
        let mut mapping = FieldMapping::for_schema(&schema);
        for i in 0..3 {
            mapping.set(&format!("field{i}"), Some("x".into()));
        }

        let report = validator().validate(&mapping, &schema, &ocr_with_confidence(0.9));
        assert!((report.completeness_score - 0.3).abs() < 1e-9);
        assert_eq!(report.empty_fields.len(), 7);

        let aggregates: Vec<_> = report
            .accuracy_warnings
            .iter()
            .filter(|w| w.starts_with("Low "))
            .collect();
        assert_eq!(aggregates.len(), 1);
        assert!(aggregates[0].starts_with("Low completeness"));
    }

    #[test]
    fn test_low_confidence_warning() {
        let schema = fixtures::english_schema();
        let report = validator().validate(&filled_english(), &schema, &ocr_with_confidence(0.3));
        assert_eq!(report.accuracy_warnings, ["Low OCR confidence: average 0.30"]);
    }

    #[test]
    fn test_average_confidence_is_clamped() {
        let ocr = OcrResult::from_text("t")
            .with_region(RegionConfidence::new("a", "t", 1.4))
            .with_region(RegionConfidence::new("b", "t", 1.2));
        assert_eq!(average_confidence(&ocr), 1.0);
        assert_eq!(average_confidence(&OcrResult::default()), 0.0);
    }

    #[test]
    fn test_field_confidence_is_reported() {
        let schema = fixtures::english_schema();
        let mut fields = filled_english();
        fields.get_mut("idNumber").unwrap().confidence = Some(0.91);

        let report = validator().validate(&fields, &schema, &ocr_with_confidence(0.9));
        assert_eq!(report.field_confidence.len(), 1);
        assert_eq!(report.field_confidence["idNumber"], 0.91);
    }
}
