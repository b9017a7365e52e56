//! Mock implementations of the capability traits.
//!
//! Both mocks are cheap to clone and share their recorded history between
//! clones, so a test can hand one copy to the pipeline and inspect the other.

mod language;
mod optical;

pub use language::{LanguageOutcome, MockLanguageConfig, MockLanguageProvider};
pub use optical::{MockOpticalConfig, MockOpticalProvider, OcrOutcome};
