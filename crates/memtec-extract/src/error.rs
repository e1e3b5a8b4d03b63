//! Extraction error types.

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors that can occur while extracting text from a document.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The source file does not exist.
    #[error("file not found: {0}")]
    NotFound(String),

    /// The file extension is not a supported document format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The decoder rejected the file content.
    #[error("parse failed: {0}")]
    Parse(String),

    /// I/O error while reading the file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Creates a not found error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Creates an unsupported format error.
    pub fn unsupported_format(ext: impl Into<String>) -> Self {
        Self::UnsupportedFormat(ext.into())
    }

    /// Creates a parse error.
    pub fn parse(msg: impl std::fmt::Display) -> Self {
        Self::Parse(msg.to_string())
    }
}
