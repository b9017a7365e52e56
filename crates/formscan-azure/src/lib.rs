#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing targets for observability
/// Logging target for shared HTTP client operations.
pub const TRACING_TARGET_CLIENT: &str = "formscan_azure::client";

/// Logging target for Document Intelligence operations.
pub const TRACING_TARGET_DOCUMENT: &str = "formscan_azure::document";

/// Logging target for Azure OpenAI operations.
pub const TRACING_TARGET_OPENAI: &str = "formscan_azure::openai";

mod error;

pub mod client;
pub mod connect;
pub mod document;
pub mod openai;

pub use client::{AzClient, AzConfig};
pub use connect::{DocumentIntelligenceArgs, OpenAiArgs};
pub use document::DocumentIntelligence;
pub use error::{Error, Result};
pub use openai::OpenAiChat;
