//! Schema-constrained field interpretation with a language model.

mod correct;
mod parse;
mod prompt;

use std::fmt;
use std::sync::Arc;

use formscan_core::types::{FieldMapping, OcrResult, Schema};
use formscan_core::{CompletionRequest, Context, LanguageProvider, ResponseFormat};
use jiff::Timestamp;

use crate::config::InterpreterConfig;
use crate::rules::FormatRules;
use crate::{Error, Result, TRACING_TARGET_INTERPRETER};

/// The first attempt plus one corrective retry.
const MAX_ATTEMPTS: u32 = 2;

/// Interpreted fields and the warnings raised while producing them.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    /// Schema-shaped field values.
    pub fields: FieldMapping,
    /// Processing warnings, in the order they were raised.
    pub warnings: Vec<String>,
}

/// Maps OCR output onto a schema's fields.
#[derive(Clone)]
pub struct FieldInterpreter {
    provider: Arc<dyn LanguageProvider>,
    config: InterpreterConfig,
    rules: FormatRules,
}

impl fmt::Debug for FieldInterpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInterpreter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FieldInterpreter {
    /// Creates a new interpreter.
    pub fn new(
        provider: Arc<dyn LanguageProvider>,
        config: InterpreterConfig,
        rules: FormatRules,
    ) -> Self {
        Self {
            provider,
            config,
            rules,
        }
    }

    /// Interprets OCR output into a mapping whose keys are exactly the
    /// schema's field names.
    ///
    /// A capability error, a timeout or an unparsable reply consumes an
    /// attempt; the retry uses a stricter prompt quoting the failure. Fails
    /// with [`Error::InterpretationFailed`] once both attempts are used up.
    pub async fn interpret(
        &self,
        context: &Context,
        ocr: &OcrResult,
        schema: &Schema,
    ) -> Result<Interpretation> {
        let timeout = self.config.timeout();
        let mut failure: Option<String> = None;
        let mut raw_response: Option<String> = None;

        for attempt in 1..=MAX_ATTEMPTS {
            let started_at = Timestamp::now();
            let request = self.request(ocr, schema, failure.as_deref())?;

            tracing::debug!(
                target: TRACING_TARGET_INTERPRETER,
                run_id = %context.run_id,
                request_id = %request.request_id,
                attempt,
                language = %schema.language(),
                "Processing interpretation request"
            );

            let outcome = tokio::time::timeout(timeout, self.provider.complete(context, &request)).await;
            let elapsed = Timestamp::now().duration_since(started_at);

            let reason = match outcome {
                Err(_) => format!("no reply within {}ms", timeout.as_millis()),
                Ok(Err(error)) => format!("language capability failed: {}", error),
                Ok(Ok(response)) => match parse::parse_reply(&response.content, schema) {
                    Ok(parsed) => {
                        let interpretation = self.finish(parsed, ocr, schema);
                        tracing::debug!(
                            target: TRACING_TARGET_INTERPRETER,
                            run_id = %context.run_id,
                            attempt,
                            total_tokens = response.total_tokens,
                            warnings = interpretation.warnings.len(),
                            elapsed_ms = elapsed.as_millis(),
                            "Interpretation successful"
                        );
                        return Ok(interpretation);
                    }
                    Err(reason) => {
                        raw_response = Some(response.content);
                        reason
                    }
                },
            };

            tracing::warn!(
                target: TRACING_TARGET_INTERPRETER,
                run_id = %context.run_id,
                attempt,
                reason = %reason,
                elapsed_ms = elapsed.as_millis(),
                "Interpretation attempt failed"
            );
            failure = Some(reason);
        }

        Err(Error::InterpretationFailed {
            reason: failure.unwrap_or_default(),
            raw_response,
        })
    }

    fn request(
        &self,
        ocr: &OcrResult,
        schema: &Schema,
        failure: Option<&str>,
    ) -> Result<CompletionRequest> {
        let prompt = match failure {
            None => prompt::build(ocr, schema),
            Some(failure) => prompt::build_retry(ocr, schema, failure),
        };

        CompletionRequest::builder()
            .with_system(prompt::PREAMBLE)
            .with_prompt(prompt)
            .with_response_format(ResponseFormat::JsonObject)
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens)
            .build()
            .map_err(|e| Error::config(format!("invalid completion request: {}", e)))
    }

    fn finish(&self, parsed: parse::ParsedReply, ocr: &OcrResult, schema: &Schema) -> Interpretation {
        let parse::ParsedReply {
            mut fields,
            mut warnings,
        } = parsed;

        correct::apply(&mut fields, schema, &self.rules, &mut warnings);
        correct::attribute_confidence(&mut fields, ocr);

        Interpretation { fields, warnings }
    }
}
