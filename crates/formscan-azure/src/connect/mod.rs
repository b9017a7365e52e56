//! Connection arguments for the Azure adapters.

mod config;

pub use config::{DocumentIntelligenceArgs, OpenAiArgs};
