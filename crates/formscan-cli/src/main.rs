#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod report;
mod telemetry;

use std::path::Path;
use std::process;

use anyhow::{Context, bail};
use formscan_core::types::ExtractionResult;

use crate::config::{Cli, create_processor};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "formscan_cli::startup";
pub const TRACING_TARGET_CONFIG: &str = "formscan_cli::config";
pub const TRACING_TARGET_RUN: &str = "formscan_cli::run";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::debug!(target: TRACING_TARGET_RUN, "formscan finished successfully");
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_RUN,
            error = %format!("{error:#}"),
            "formscan terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing(cli.run.verbose)?;
    cli.log();
    cli.run.validate().context("invalid run configuration")?;

    let processor = create_processor(&cli).await?;

    if cli.run.writes_directory()
        && let Some(dir) = &cli.run.output
    {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
    }

    let results = processor
        .process_batch(&cli.run.inputs, cli.run.language, cli.run.concurrency)
        .await;

    let mut failed = 0;
    for (input, result) in cli.run.inputs.iter().zip(results) {
        match result {
            Ok(extraction) => emit(&cli, input, &extraction).await?,
            Err(error) => {
                failed += 1;
                tracing::error!(
                    target: TRACING_TARGET_RUN,
                    input = %input.display(),
                    stage = ?error.stage(),
                    category = error.category(),
                    error = %error,
                    "Document failed"
                );
                if let formscan_pipeline::Error::InterpretationFailed {
                    raw_response: Some(raw),
                    ..
                } = error.root()
                {
                    tracing::debug!(
                        target: TRACING_TARGET_RUN,
                        input = %input.display(),
                        raw_response = %raw,
                        "Last model reply"
                    );
                }
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} document(s) failed", failed, cli.run.inputs.len());
    }
    Ok(())
}

/// Writes or prints one successful result.
async fn emit(cli: &Cli, input: &Path, extraction: &ExtractionResult) -> anyhow::Result<()> {
    match cli.run.output_path(input) {
        Some(path) => report::write_result(&path, extraction).await,
        None => {
            print!("{}", report::render_summary(input, extraction));
            Ok(())
        }
    }
}
