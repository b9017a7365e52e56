//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── run: RunConfig                                # inputs, output, language, tuning
//! ├── document_intelligence: DocumentIntelligenceArgs  # OCR endpoint and key
//! └── openai: OpenAiArgs                            # chat endpoint, key and model
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.

mod provider;
mod run;

use std::process;

use clap::Parser;
use formscan_azure::{DocumentIntelligenceArgs, OpenAiArgs};
pub use provider::create_processor;
pub use run::RunConfig;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "formscan")]
#[command(about = "Extract structured fields from scanned forms")]
#[command(version)]
pub struct Cli {
    /// Inputs, output and pipeline tuning.
    #[clap(flatten)]
    pub run: RunConfig,

    /// Azure Document Intelligence connection.
    #[clap(flatten)]
    pub document_intelligence: DocumentIntelligenceArgs,

    /// Azure OpenAI connection.
    #[clap(flatten)]
    pub openai: OpenAiArgs,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments so that its
    /// variables act as defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();
        self.run.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            document_intelligence_endpoint = %self.document_intelligence.endpoint,
            document_intelligence_api_version = %self.document_intelligence.api_version,
            openai_endpoint = %self.openai.endpoint,
            openai_model = %self.openai.model,
            openai_api_version = %self.openai.api_version,
            "Azure configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
