#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod document;
mod docx;
mod error;
mod extractor;
mod normalize;
mod pdf;
mod repeats;

pub use document::{DocumentFormat, ExtractionResult, ParsedSection, SourceMetadata};
pub use error::{ExtractError, ExtractResult};
pub use extractor::DocumentExtractor;
pub use normalize::TextNormalizer;
pub use repeats::{FrequencyRepeatDetector, RepeatDetector, remove_repeats};

/// Tracing target for extraction operations.
pub const TRACING_TARGET: &str = "memtec_extract";
