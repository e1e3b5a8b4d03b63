//! Extraction result types.

use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::error::{ExtractError, ExtractResult};

/// Supported source document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// Portable Document Format.
    Pdf,
    /// Word-processor document (`.docx` or legacy `.doc`).
    Docx,
}

impl DocumentFormat {
    /// Resolves the format from a file extension.
    pub fn from_path(path: &Path) -> ExtractResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" | "doc" => Ok(Self::Docx),
            "" => Err(ExtractError::unsupported_format("missing file extension")),
            other => Err(ExtractError::unsupported_format(format!(".{other}"))),
        }
    }
}

/// An ordered structural unit extracted from a document.
///
/// Sections concatenate with a blank-line separator to form the document's
/// full text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedSection {
    /// Section title, when one could be determined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Raw text content of the section.
    pub content: String,

    /// Page number the section starts on (1-indexed, PDF only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Order index within the document. PDF extraction keeps the page
    /// number here, so skipped blank pages leave gaps.
    pub order: u32,
}

/// Document-level metadata copied from the file's embedded properties.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
}

impl SourceMetadata {
    /// Returns true when no metadata field is populated.
    pub fn is_empty(&self) -> bool {
        self.author.is_none()
            && self.creator.is_none()
            && self.producer.is_none()
            && self.subject.is_none()
            && self.title.is_none()
            && self.created.is_none()
            && self.modified.is_none()
    }
}

/// The output of a single extraction call.
///
/// Ephemeral: consumed immediately by chunking, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Ordered sections extracted from the document.
    pub sections: Vec<ParsedSection>,

    /// Cleaned full text (normalized, repeated artifacts removed).
    pub full_text: String,

    /// Character count of the cleaned full text.
    pub char_count: usize,

    /// Total page count (PDF only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,

    /// Total paragraph count (DOCX only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph_count: Option<u32>,

    /// Metadata copied from the document's embedded properties.
    pub metadata: SourceMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_dispatch_by_extension() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("offre.pdf")).unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("memoire.DOCX")).unwrap(),
            DocumentFormat::Docx
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("ancien.doc")).unwrap(),
            DocumentFormat::Docx
        );
    }

    #[test]
    fn format_serializes_lowercase() {
        assert_eq!(DocumentFormat::Pdf.to_string(), "pdf");
        assert_eq!(DocumentFormat::Docx.as_ref(), "docx");
    }

    #[test]
    fn format_rejects_unknown_extension() {
        let err = DocumentFormat::from_path(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(_)));

        let err = DocumentFormat::from_path(Path::new("no_extension")).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(_)));
    }
}
