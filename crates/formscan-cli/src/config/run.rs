//! Run configuration: what to process and where results go.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Args;
use formscan_core::types::LanguageSelector;
use formscan_pipeline::PipelineConfig;

use crate::TRACING_TARGET_CONFIG;

/// Inputs, output and pipeline tuning.
#[derive(Debug, Clone, Args)]
pub struct RunConfig {
    /// Form files to process (PDF, PNG, JPEG, TIFF, BMP, HEIF)
    #[arg(required = true, value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// Write JSON results here: a file for a single input, otherwise a directory
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Form language, or `auto` to detect it from the recognized text
    #[arg(long = "language", value_enum, default_value_t = LanguageSelector::Auto)]
    pub language: LanguageSelector,

    /// Directory holding `schema_english.json` and `schema_hebrew.json`
    #[arg(long = "schema-dir", env = "FORMSCAN_SCHEMA_DIR", value_name = "DIR")]
    pub schema_dir: Option<PathBuf>,

    /// JSON file overriding pipeline settings
    #[arg(long = "pipeline-config", env = "FORMSCAN_PIPELINE_CONFIG", value_name = "FILE")]
    pub pipeline_config: Option<PathBuf>,

    /// Number of documents processed at the same time
    #[arg(long = "concurrency", default_value_t = 4)]
    pub concurrency: usize,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl RunConfig {
    /// Validates option combinations.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.concurrency == 0 {
            bail!("--concurrency must be at least 1");
        }
        if let Some(dir) = &self.schema_dir
            && !dir.is_dir()
        {
            bail!("schema directory '{}' does not exist", dir.display());
        }
        Ok(())
    }

    /// Loads the pipeline configuration, or the defaults when none is given.
    pub async fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        match &self.pipeline_config {
            Some(path) => PipelineConfig::from_file(path)
                .await
                .with_context(|| format!("failed to load pipeline config '{}'", path.display())),
            None => Ok(PipelineConfig::default()),
        }
    }

    /// Where the JSON result of `input` is written, if anywhere.
    ///
    /// A single input with an output path that is not an existing directory
    /// writes to that path; otherwise results go to `{output}/{stem}.json`.
    pub fn output_path(&self, input: &Path) -> Option<PathBuf> {
        let output = self.output.as_ref()?;
        if self.inputs.len() == 1 && !output.is_dir() {
            return Some(output.clone());
        }

        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "result".to_owned());
        Some(output.join(format!("{stem}.json")))
    }

    /// Returns true if results are written as a directory of files.
    pub fn writes_directory(&self) -> bool {
        self.output
            .as_ref()
            .is_some_and(|output| self.inputs.len() > 1 || output.is_dir())
    }

    /// Logs the run configuration.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            inputs = self.inputs.len(),
            output = ?self.output,
            language = %self.language,
            schema_dir = ?self.schema_dir,
            pipeline_config = ?self.pipeline_config,
            concurrency = self.concurrency,
            "Run configuration"
        );
    }
}
