#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod fixtures;
mod mock;

pub use mock::{
    LanguageOutcome, MockLanguageConfig, MockLanguageProvider, MockOpticalConfig,
    MockOpticalProvider, OcrOutcome,
};
