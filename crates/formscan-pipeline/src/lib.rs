#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for OCR extraction.
pub const TRACING_TARGET_OCR: &str = "formscan_pipeline::ocr";

/// Tracing target for field interpretation.
pub const TRACING_TARGET_INTERPRETER: &str = "formscan_pipeline::interpreter";

/// Tracing target for validation.
pub const TRACING_TARGET_VALIDATOR: &str = "formscan_pipeline::validator";

/// Tracing target for pipeline orchestration.
pub const TRACING_TARGET_PROCESSOR: &str = "formscan_pipeline::processor";

/// Tracing target for schema loading.
pub const TRACING_TARGET_SCHEMA: &str = "formscan_pipeline::schema";

mod config;
mod error;
mod extractor;
mod interpreter;
mod processor;
mod rules;
mod schema;
mod validator;

pub use config::{ExtractorConfig, InterpreterConfig, PipelineConfig, ValidatorConfig};
pub use error::{AttemptFailure, Error, Result, Stage};
pub use extractor::OcrExtractor;
pub use interpreter::{FieldInterpreter, Interpretation};
pub use processor::FormProcessor;
pub use rules::{FormatRules, PhoneCorrection, PhonePattern};
pub use schema::SchemaRegistry;
pub use validator::FieldValidator;
