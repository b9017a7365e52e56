//! Optical character recognition capability.
//!
//! The pipeline talks to OCR backends only through [`OpticalProvider`];
//! concrete backends live in their own crates.

mod request;

pub use request::{OcrConfiguration, OcrConfigurationBuilder, OcrRequest};

use crate::types::OcrResult;
use crate::{Context, Result};

/// Trait for OCR backends.
///
/// Implement this trait to plug a new text, table and selection-mark
/// extractor into the pipeline.
#[async_trait::async_trait]
pub trait OpticalProvider: Send + Sync {
    /// Analyzes a document with the configuration carried by the request.
    async fn analyze(&self, context: &Context, request: &OcrRequest) -> Result<OcrResult>;
}
