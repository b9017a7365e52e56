#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for document loading.
pub const TRACING_TARGET: &str = "formscan_core";

mod context;
mod error;

pub mod completion;
pub mod optical;
pub mod types;

pub use completion::{CompletionRequest, CompletionResponse, LanguageProvider, ResponseFormat};
pub use context::Context;
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use optical::{OcrConfiguration, OcrRequest, OpticalProvider};
