//! Data model shared by every pipeline stage.

mod document;
mod fields;
mod language;
mod ocr;
mod report;
mod result;
mod schema;

pub use document::{Document, DocumentId, MediaKind};
pub use fields::{FieldMapping, FieldValue};
pub use language::{FormLanguage, LanguageSelector};
pub use ocr::{KeyValuePair, OcrResult, RegionConfidence, TableRegion};
pub use report::ValidationReport;
pub use result::ExtractionResult;
pub use schema::{FieldSpec, FieldType, RESERVED_KEYS, Schema};
