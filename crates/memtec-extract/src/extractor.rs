//! Format dispatch and the extraction pipeline.

use std::path::Path;

use crate::TRACING_TARGET;
use crate::document::{DocumentFormat, ExtractionResult};
use crate::docx;
use crate::error::{ExtractError, ExtractResult};
use crate::normalize::TextNormalizer;
use crate::pdf;
use crate::repeats::{FrequencyRepeatDetector, RepeatDetector, remove_repeats};

/// Extracts raw text and structural sections from source documents.
///
/// Dispatches on file extension, then runs the extracted text through
/// normalization and repeated header/footer removal so the resulting
/// full text is ready for chunking.
pub struct DocumentExtractor {
    normalizer: TextNormalizer,
    detector: Box<dyn RepeatDetector>,
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentExtractor {
    /// Creates an extractor with the count-based repeat detector.
    pub fn new() -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            detector: Box::new(FrequencyRepeatDetector::default()),
        }
    }

    /// Creates an extractor with a custom repeat detection strategy.
    pub fn with_detector(detector: Box<dyn RepeatDetector>) -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            detector,
        }
    }

    /// Extracts a document, dispatching on its file extension.
    ///
    /// Fails with [`ExtractError::NotFound`] when the path does not resolve,
    /// [`ExtractError::UnsupportedFormat`] for unknown extensions, and
    /// [`ExtractError::Parse`] when the decoder rejects the content.
    pub fn extract(&self, path: &Path) -> ExtractResult<ExtractionResult> {
        if !path.exists() {
            return Err(ExtractError::not_found(path.display().to_string()));
        }
        let format = DocumentFormat::from_path(path)?;

        let (sections, page_count, paragraph_count, metadata) = match format {
            DocumentFormat::Pdf => {
                let content = pdf::extract_pdf(path)?;
                (
                    content.sections,
                    Some(content.page_count),
                    None,
                    content.metadata,
                )
            }
            DocumentFormat::Docx => {
                let content = docx::extract_docx(path)?;
                (
                    content.sections,
                    None,
                    Some(content.paragraph_count),
                    content.metadata,
                )
            }
        };

        let raw_text = sections
            .iter()
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let normalized = self.normalizer.normalize(&raw_text);
        let repeats = self.detector.detect_repeats(&normalized);
        let full_text = remove_repeats(&normalized, &repeats);
        let char_count = full_text.chars().count();

        tracing::info!(
            target: TRACING_TARGET,
            path = %path.display(),
            format = ?format,
            sections = sections.len(),
            repeats = repeats.len(),
            char_count,
            "Document extracted"
        );

        Ok(ExtractionResult {
            sections,
            full_text,
            char_count,
            page_count,
            paragraph_count,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_fails_with_not_found() {
        let extractor = DocumentExtractor::new();
        let err = extractor
            .extract(Path::new("/nonexistent/memoire.pdf"))
            .unwrap_err();
        assert!(matches!(err, ExtractError::NotFound(_)));
    }

    #[test]
    fn unknown_extension_fails_before_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "plain text").unwrap();

        let err = DocumentExtractor::new().extract(&path).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(_)));
    }

    #[test]
    fn corrupt_pdf_fails_with_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let err = DocumentExtractor::new().extract(&path).unwrap_err();
        assert!(matches!(err, ExtractError::Parse(_)));
    }
}
