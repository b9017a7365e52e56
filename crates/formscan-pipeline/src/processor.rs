//! End-to-end orchestration of one or many pipeline runs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use formscan_core::types::{
    Document, ExtractionResult, FormLanguage, LanguageSelector, OcrResult, Schema,
};
use formscan_core::{Context, LanguageProvider, OpticalProvider};
use futures::StreamExt;
use futures::stream;

use crate::config::PipelineConfig;
use crate::{
    Error, FieldInterpreter, FieldValidator, OcrExtractor, Result, SchemaRegistry, Stage,
    TRACING_TARGET_PROCESSOR,
};

/// Runs the OCR, interpretation and validation stages for a document.
///
/// Cheap to clone; clones share the providers and the schema registry, so
/// independent documents can be processed concurrently.
#[derive(Debug, Clone)]
pub struct FormProcessor {
    registry: Arc<SchemaRegistry>,
    extractor: OcrExtractor,
    interpreter: FieldInterpreter,
    validator: FieldValidator,
}

impl FormProcessor {
    /// Creates a processor from capabilities, a registry and a configuration.
    pub fn new(
        optical: Arc<dyn OpticalProvider>,
        language: Arc<dyn LanguageProvider>,
        registry: Arc<SchemaRegistry>,
        config: PipelineConfig,
    ) -> Self {
        let PipelineConfig {
            extractor,
            interpreter,
            validator,
            rules,
        } = config;

        Self {
            registry,
            extractor: OcrExtractor::new(optical, extractor),
            interpreter: FieldInterpreter::new(language, interpreter, rules.clone()),
            validator: FieldValidator::new(validator, rules),
        }
    }

    /// Schema registry used by this processor.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Processes one document.
    ///
    /// With an explicit language the schema is resolved before OCR runs;
    /// under [`LanguageSelector::Auto`] the language is detected from the
    /// recognized text. Schema, OCR and interpretation failures are returned
    /// as [`Error::PipelineFailed`] naming the stage.
    pub async fn process(
        &self,
        document: Document,
        selector: LanguageSelector,
    ) -> Result<ExtractionResult> {
        let context = Context::new();

        tracing::info!(
            target: TRACING_TARGET_PROCESSOR,
            run_id = %context.run_id,
            document_id = %document.id,
            filename = document.filename.as_deref().unwrap_or("-"),
            language = %selector,
            "Processing document"
        );

        let explicit = match selector.explicit() {
            Some(language) => Some(
                self.registry
                    .get(language)
                    .map_err(|e| Error::at_stage(Stage::Schema, e))?,
            ),
            None => None,
        };
        let require_regions = match &explicit {
            Some(schema) => schema.expects_regions(),
            None => self
                .registry
                .expects_regions(selector)
                .map_err(|e| Error::at_stage(Stage::Schema, e))?,
        };

        let ocr = self
            .extractor
            .extract(&context, &document, require_regions)
            .await
            .map_err(|e| Error::at_stage(Stage::Ocr, e))?;

        let schema = match explicit {
            Some(schema) => schema,
            None => self
                .detect_schema(&context, &ocr)
                .map_err(|e| Error::at_stage(Stage::Schema, e))?,
        };

        let interpretation = self
            .interpreter
            .interpret(&context, &ocr, &schema)
            .await
            .map_err(|e| Error::at_stage(Stage::Interpretation, e))?;

        let validation = self.validator.validate(&interpretation.fields, &schema, &ocr);

        let mut processing_warnings = interpretation.warnings;
        processing_warnings.extend(validation.accuracy_warnings.iter().cloned());

        tracing::info!(
            target: TRACING_TARGET_PROCESSOR,
            run_id = %context.run_id,
            language = %schema.language(),
            completeness = validation.completeness_score,
            confidence = validation.average_ocr_confidence,
            warnings = processing_warnings.len(),
            elapsed_ms = context.elapsed().as_millis(),
            "Document processed"
        );

        Ok(ExtractionResult {
            fields: interpretation.fields,
            validation,
            source_language_detected: schema.language(),
            processing_warnings,
        })
    }

    /// Reads a document from disk and processes it.
    pub async fn process_path(
        &self,
        path: impl AsRef<Path>,
        selector: LanguageSelector,
    ) -> Result<ExtractionResult> {
        let document = Document::from_path(path)
            .await
            .map_err(|e| Error::at_stage(Stage::Input, e))?;
        self.process(document, selector).await
    }

    /// Processes several files, at most `concurrency` at a time.
    ///
    /// Results are returned in input order; one failure does not affect the
    /// other runs.
    pub async fn process_batch(
        &self,
        paths: &[PathBuf],
        selector: LanguageSelector,
        concurrency: usize,
    ) -> Vec<Result<ExtractionResult>> {
        let mut results: Vec<(usize, Result<ExtractionResult>)> =
            stream::iter(paths.iter().enumerate())
                .map(|(index, path)| async move { (index, self.process_path(path, selector).await) })
                .buffer_unordered(concurrency.max(1))
                .collect()
                .await;

        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, result)| result).collect()
    }

    fn detect_schema(&self, context: &Context, ocr: &OcrResult) -> Result<Arc<Schema>> {
        let language = FormLanguage::detect(&ocr.raw_text);
        tracing::debug!(
            target: TRACING_TARGET_PROCESSOR,
            run_id = %context.run_id,
            language = %language,
            "Detected form language"
        );
        self.registry.get(language)
    }
}
