//! Deterministic post-processing of interpreted values.

use formscan_core::types::{FieldMapping, FieldType, OcrResult, Schema};

use crate::rules::{
    FormatRules, collapse_whitespace, normalize_date, normalize_digits, strip_number_separators,
};

/// Normalizes every value according to its field type.
///
/// Phone prefix repairs are reported in `warnings`. Applying this to its
/// own output changes nothing.
pub(super) fn apply(
    fields: &mut FieldMapping,
    schema: &Schema,
    rules: &FormatRules,
    warnings: &mut Vec<String>,
) {
    for field in schema.fields() {
        let Some(entry) = fields.get_mut(&field.name) else {
            continue;
        };
        let Some(raw) = entry.value.take() else {
            continue;
        };

        let cleaned = collapse_whitespace(&normalize_digits(&raw));
        let value = match &field.field_type {
            FieldType::String => cleaned,
            FieldType::IdNumber => strip_number_separators(&cleaned),
            FieldType::Phone => {
                let digits = strip_number_separators(&cleaned);
                match rules.correct_phone(&digits) {
                    Some((corrected, rule)) => {
                        warnings.push(format!(
                            "Corrected field '{}' from '{}' to '{}' (leading '{}' read as '{}')",
                            field.name, digits, corrected, rule.to, rule.from
                        ));
                        corrected
                    }
                    None => digits,
                }
            }
            FieldType::Date => normalize_date(&cleaned),
            FieldType::EnumChoice { choices } => choices
                .iter()
                .find(|choice| choice.trim().to_lowercase() == cleaned.to_lowercase())
                .cloned()
                .unwrap_or(cleaned),
        };

        entry.value = (!value.is_empty()).then_some(value);
    }
}

/// Attributes OCR confidence to each filled field.
///
/// A field takes the highest confidence among regions whose text contains
/// its value, or whose text is contained in it for values spanning several
/// regions.
pub(super) fn attribute_confidence(fields: &mut FieldMapping, ocr: &OcrResult) {
    let regions: Vec<(String, f64)> = ocr
        .region_confidences
        .iter()
        .map(|region| (match_key(&region.text), region.confidence))
        .filter(|(key, _)| !key.is_empty())
        .collect();

    for (_, entry) in fields.iter_mut() {
        let Some(value) = entry.filled() else {
            entry.confidence = None;
            continue;
        };
        let value = match_key(value);
        if value.is_empty() {
            entry.confidence = None;
            continue;
        }

        entry.confidence = regions
            .iter()
            .filter(|(region, _)| {
                region.contains(&value) || (region.chars().count() >= 3 && value.contains(region))
            })
            .map(|(_, confidence)| *confidence)
            .reduce(f64::max);
    }
}

/// Lowercased alphanumerics with ASCII digits, for fuzzy text matching.
fn match_key(text: &str) -> String {
    normalize_digits(text)
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use formscan_core::types::{FieldSpec, FormLanguage, RegionConfidence};

    use super::*;

    fn schema() -> Schema {
        Schema::new(
            FormLanguage::English,
            vec![
                FieldSpec::required("fullName", FieldType::String),
                FieldSpec::required("idNumber", FieldType::IdNumber),
                FieldSpec::required("mobilePhone", FieldType::Phone),
                FieldSpec::optional("landlinePhone", FieldType::Phone),
                FieldSpec::required("dateOfInjury", FieldType::Date),
                FieldSpec::required(
                    "gender",
                    FieldType::EnumChoice {
                        choices: vec!["male".into(), "female".into()],
                    },
                ),
            ],
        )
        .unwrap()
    }

    fn mapping(values: &[(&str, &str)]) -> FieldMapping {
        let mut fields = FieldMapping::for_schema(&schema());
        for (name, value) in values {
            fields.set(name, Some((*value).to_owned()));
        }
        fields
    }

    #[test]
    fn test_phone_misread_is_corrected_with_warning() {
        let mut fields = mapping(&[("mobilePhone", "8501234567")]);
        let mut warnings = Vec::new();
        apply(&mut fields, &schema(), &FormatRules::default(), &mut warnings);

        assert_eq!(fields.value("mobilePhone"), Some("0501234567"));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("'8501234567' to '0501234567'"));
    }

    #[test]
    fn test_normalization() {
        let mut fields = mapping(&[
            ("fullName", "  Dana \n  Cohen "),
            ("idNumber", "1234-5678 2"),
            ("mobilePhone", "٠٥٠-١٢٣-٤٥٦٧"),
            ("landlinePhone", "(02) 654-3210"),
            ("dateOfInjury", "5.1.2024"),
            ("gender", "FEMALE"),
        ]);
        let mut warnings = Vec::new();
        apply(&mut fields, &schema(), &FormatRules::default(), &mut warnings);

        assert_eq!(fields.value("fullName"), Some("Dana Cohen"));
        assert_eq!(fields.value("idNumber"), Some("123456782"));
        assert_eq!(fields.value("mobilePhone"), Some("0501234567"));
        assert_eq!(fields.value("landlinePhone"), Some("026543210"));
        assert_eq!(fields.value("dateOfInjury"), Some("05/01/2024"));
        assert_eq!(fields.value("gender"), Some("female"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut fields = mapping(&[
            ("mobilePhone", "850 123 4567"),
            ("dateOfInjury", "5/1/2024"),
            ("fullName", " x "),
        ]);
        let rules = FormatRules::default();
        let mut warnings = Vec::new();
        apply(&mut fields, &schema(), &rules, &mut warnings);
        let once = fields.clone();

        let mut more = Vec::new();
        apply(&mut fields, &schema(), &rules, &mut more);
        assert_eq!(fields, once);
        assert!(more.is_empty());
    }

    #[test]
    fn test_values_that_become_empty_are_null() {
        let mut fields = mapping(&[("idNumber", " - / ")]);
        apply(&mut fields, &schema(), &FormatRules::default(), &mut Vec::new());
        assert!(fields.get("idNumber").unwrap().value.is_none());
    }

    #[test]
    fn test_confidence_takes_best_matching_region() {
        let mut fields = mapping(&[
            ("fullName", "Dana Cohen"),
            ("mobilePhone", "0501234567"),
            ("idNumber", "999999999"),
        ]);
        let ocr = OcrResult::from_text("...")
            .with_region(RegionConfidence::new("p1:w0", "Dana", 0.7))
            .with_region(RegionConfidence::new("p1:w1", "Cohen", 0.9))
            .with_region(RegionConfidence::new("p1:w2", "050-1234567", 0.8))
            .with_region(RegionConfidence::new("p1:w3", "0501234567.", 0.95));

        attribute_confidence(&mut fields, &ocr);
        assert_eq!(fields.get("fullName").unwrap().confidence, Some(0.9));
        assert_eq!(fields.get("mobilePhone").unwrap().confidence, Some(0.95));
        assert_eq!(fields.get("idNumber").unwrap().confidence, None);
        assert_eq!(fields.get("gender").unwrap().confidence, None);
    }
}
