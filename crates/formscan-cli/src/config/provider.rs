//! Capability and pipeline construction.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use formscan_pipeline::{FormProcessor, SchemaRegistry};

use super::Cli;
use crate::TRACING_TARGET_CONFIG;

/// Creates the form processor from CLI configuration.
///
/// # Errors
///
/// Returns an error if a provider cannot be initialized, the pipeline
/// configuration is invalid, or a schema fails to load.
pub async fn create_processor(cli: &Cli) -> anyhow::Result<FormProcessor> {
    let optical = cli
        .document_intelligence
        .build()
        .context("failed to create Document Intelligence client")?;
    let language = cli
        .openai
        .build()
        .context("failed to create Azure OpenAI client")?;

    let registry = match &cli.run.schema_dir {
        Some(dir) => SchemaRegistry::from_dir(dir),
        None => SchemaRegistry::builtin(),
    };
    registry.preload().context("failed to load form schemas")?;

    let config = cli.run.pipeline_config().await?;
    config.validate().context("invalid pipeline configuration")?;

    if !leaves_room_for_polling(optical.poll_budget(), config.extractor.attempt_timeout()) {
        tracing::warn!(
            target: TRACING_TARGET_CONFIG,
            poll_budget_ms = optical.poll_budget().as_millis(),
            attempt_timeout_ms = config.extractor.attempt_timeout_ms,
            "OCR attempt timeout may cut off analyses that are still being polled"
        );
    }

    tracing::debug!(
        target: TRACING_TARGET_CONFIG,
        configurations = ?config
            .extractor
            .configurations
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>(),
        attempt_timeout_ms = config.extractor.attempt_timeout_ms,
        interpreter_timeout_ms = config.interpreter.timeout_ms,
        "Pipeline configuration"
    );

    Ok(FormProcessor::new(
        Arc::new(optical),
        Arc::new(language),
        Arc::new(registry),
        config,
    ))
}

/// Returns true if an attempt can fit a full polling budget plus as much
/// time again for submitting the document.
fn leaves_room_for_polling(poll_budget: Duration, attempt_timeout: Duration) -> bool {
    poll_budget * 2 <= attempt_timeout
}
