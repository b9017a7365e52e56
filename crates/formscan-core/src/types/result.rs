//! Top-level extraction result and its flat JSON representation.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{FieldMapping, FieldValue, FormLanguage, ValidationReport};

const VALIDATION: &str = "validation";
const SOURCE_LANGUAGE: &str = "source_language_detected";
const PROCESSING_WARNINGS: &str = "processing_warnings";

/// Artifact returned to the caller for one processed document.
///
/// Serializes to a flat JSON object whose top-level keys are the schema's
/// field names (in schema order) plus `validation`,
/// `source_language_detected` and `processing_warnings`. Per-field
/// confidences travel inside `validation.field_confidence`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    /// Extracted field values.
    pub fields: FieldMapping,
    /// Completeness and accuracy report.
    pub validation: ValidationReport,
    /// Language of the schema that was applied.
    pub source_language_detected: FormLanguage,
    /// Warnings raised while interpreting and validating.
    pub processing_warnings: Vec<String>,
}

impl Serialize for ExtractionResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 3))?;
        for (name, field) in self.fields.iter() {
            map.serialize_entry(name, &field.value)?;
        }
        map.serialize_entry(VALIDATION, &self.validation)?;
        map.serialize_entry(SOURCE_LANGUAGE, &self.source_language_detected)?;
        map.serialize_entry(PROCESSING_WARNINGS, &self.processing_warnings)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for ExtractionResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ExtractionResultVisitor)
    }
}

struct ExtractionResultVisitor;

impl<'de> Visitor<'de> for ExtractionResultVisitor {
    type Value = ExtractionResult;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a flat extraction result object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        use serde::de::Error;

        let mut entries: Vec<(String, FieldValue)> = Vec::new();
        let mut validation: Option<ValidationReport> = None;
        let mut language: Option<FormLanguage> = None;
        let mut warnings: Option<Vec<String>> = None;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                VALIDATION => validation = Some(map.next_value()?),
                SOURCE_LANGUAGE => language = Some(map.next_value()?),
                PROCESSING_WARNINGS => warnings = Some(map.next_value()?),
                _ => {
                    if entries.iter().any(|(name, _)| *name == key) {
                        return Err(A::Error::custom(format!("duplicate field '{}'", key)));
                    }
                    let value: Option<String> = map.next_value()?;
                    entries.push((key, FieldValue::new(value)));
                }
            }
        }

        let validation = validation.ok_or_else(|| A::Error::missing_field(VALIDATION))?;
        let language = language.ok_or_else(|| A::Error::missing_field(SOURCE_LANGUAGE))?;

        for (name, field) in entries.iter_mut() {
            field.confidence = validation.field_confidence.get(name.as_str()).copied();
        }

        Ok(ExtractionResult {
            fields: FieldMapping::from_entries(entries),
            validation,
            source_language_detected: language,
            processing_warnings: warnings.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::types::{FieldSpec, FieldType, Schema};

    fn sample() -> ExtractionResult {
        let schema = Schema::new(
            FormLanguage::Hebrew,
            vec![
                FieldSpec::required("שם פרטי", FieldType::String),
                FieldSpec::required("טלפון נייד", FieldType::Phone),
                FieldSpec::optional("תא דואר", FieldType::String),
            ],
        )
        .unwrap();

        let mut fields = FieldMapping::for_schema(&schema);
        fields.set("שם פרטי", Some("דנה".into()));
        fields.set("טלפון נייד", Some("0501234567".into()));
        fields.get_mut("טלפון נייד").unwrap().confidence = Some(0.93);

        ExtractionResult {
            fields,
            validation: ValidationReport {
                completeness_score: 1.0,
                accuracy_warnings: vec!["Low OCR confidence".into()],
                invalid_format_fields: vec![],
                empty_fields: vec![],
                average_ocr_confidence: 0.42,
                field_confidence: BTreeMap::from([("טלפון נייד".to_string(), 0.93)]),
            },
            source_language_detected: FormLanguage::Hebrew,
            processing_warnings: vec!["dropped unknown key 'x'".into()],
        }
    }

    #[test]
    fn test_flat_layout() {
        let value = serde_json::to_value(sample()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 6);
        assert_eq!(object["שם פרטי"], "דנה");
        assert!(object["תא דואר"].is_null());
        assert_eq!(object["source_language_detected"], "hebrew");
        assert_eq!(object["validation"]["completeness_score"], 1.0);
    }

    #[test]
    fn test_round_trip() {
        let result = sample();
        let json = serde_json::to_string(&result).unwrap();
        let parsed: ExtractionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_round_trip_keeps_exact_scores() {
        let mut result = sample();
        result.validation.completeness_score = 2.0 / 17.0;
        result.validation.average_ocr_confidence = 0.0026984126984126986;
        result
            .validation
            .field_confidence
            .insert("שם פרטי".to_string(), 16.0 / 17.0);
        result.fields.get_mut("שם פרטי").unwrap().confidence = Some(16.0 / 17.0);

        let json = serde_json::to_string(&result).unwrap();
        let parsed: ExtractionResult = serde_json::from_str(&json).unwrap();

        assert_eq!(
            parsed.validation.average_ocr_confidence.to_bits(),
            0.0026984126984126986_f64.to_bits()
        );
        assert_eq!(
            parsed.validation.completeness_score.to_bits(),
            (2.0_f64 / 17.0).to_bits()
        );
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_missing_validation_is_rejected() {
        let json = r#"{"a": "b", "source_language_detected": "english"}"#;
        assert!(serde_json::from_str::<ExtractionResult>(json).is_err());
    }
}
