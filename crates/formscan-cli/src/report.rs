//! Result output: console summaries and JSON files.

use std::fmt::Write;
use std::path::Path;

use anyhow::Context;
use formscan_core::types::ExtractionResult;

use crate::TRACING_TARGET_RUN;

/// Renders the console summary of one result.
pub fn render_summary(input: &Path, result: &ExtractionResult) -> String {
    let mut out = String::new();
    let validation = &result.validation;

    let _ = writeln!(out, "=== {} ({}) ===", input.display(), result.source_language_detected);
    let _ = writeln!(out, "=== EXTRACTED DATA ===");
    for (name, field) in result.fields.iter() {
        let _ = writeln!(out, "  {}: {}", name, field.value.as_deref().unwrap_or("-"));
    }

    let _ = writeln!(out, "\n=== VALIDATION SUMMARY ===");
    let _ = writeln!(out, "Completeness: {:.1}%", validation.completeness_score * 100.0);
    let _ = writeln!(
        out,
        "OCR Confidence: {:.1}%",
        validation.average_ocr_confidence * 100.0
    );

    if !result.processing_warnings.is_empty() {
        let _ = writeln!(
            out,
            "\n=== WARNINGS ({} total) ===",
            result.processing_warnings.len()
        );
        for warning in &result.processing_warnings {
            let _ = writeln!(out, "  • {}", warning);
        }
    }

    out
}

/// Writes one result as pretty-printed JSON.
pub async fn write_result(path: &Path, result: &ExtractionResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(result).context("failed to serialize result")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("failed to write '{}'", path.display()))?;

    tracing::info!(
        target: TRACING_TARGET_RUN,
        path = %path.display(),
        "Result saved"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use formscan_core::types::{
        FieldMapping, FieldSpec, FieldType, FormLanguage, Schema, ValidationReport,
    };

    use super::*;

    fn result() -> ExtractionResult {
        let schema = Schema::new(
            FormLanguage::English,
            vec![
                FieldSpec::required("lastName", FieldType::String),
                FieldSpec::optional("poBox", FieldType::String),
            ],
        )
        .unwrap();
        let mut fields = FieldMapping::for_schema(&schema);
        fields.set("lastName", Some("Cohen".into()));

        ExtractionResult {
            fields,
            validation: ValidationReport {
                completeness_score: 1.0,
                average_ocr_confidence: 0.925,
                field_confidence: BTreeMap::new(),
                ..ValidationReport::default()
            },
            source_language_detected: FormLanguage::English,
            processing_warnings: vec!["Dropped unknown field 'x' from model reply".into()],
        }
    }

    #[test]
    fn test_summary() {
        let summary = render_summary(Path::new("form.pdf"), &result());
        assert!(summary.contains("  lastName: Cohen"));
        assert!(summary.contains("  poBox: -"));
        assert!(summary.contains("Completeness: 100.0%"));
        assert!(summary.contains("OCR Confidence: 92.5%"));
        assert!(summary.contains("WARNINGS (1 total)"));
    }

    #[tokio::test]
    async fn test_write_result_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.json");
        write_result(&path, &result()).await.unwrap();

        let json = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: ExtractionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result());
    }
}
