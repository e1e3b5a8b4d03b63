//! Error types for the retrieval pipeline.

use std::fmt;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the retrieval pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Provider error (API call failed, rate limited, etc.).
    #[error("provider error: {provider}: {message}")]
    Provider { provider: String, message: String },

    /// Embedding error.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Retrieval error.
    #[error("retrieval error: {0}")]
    Retrieval(String),

    /// Document not found.
    #[error("document not found: {0}")]
    DocumentNotFound(uuid::Uuid),

    /// Text extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] memtec_extract::ExtractError),

    /// Blob storage error.
    #[error("storage error: {0}")]
    Storage(#[from] memtec_opendal::StorageError),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] memtec_postgres::PgError),

    /// Vector index error.
    #[error("index error: {0}")]
    Index(#[from] memtec_vector::VectorError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a provider error.
    pub fn provider(provider: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::Provider {
            provider: provider.to_string(),
            message: message.to_string(),
        }
    }

    /// Creates an embedding error.
    pub fn embedding(message: impl fmt::Display) -> Self {
        Self::Embedding(message.to_string())
    }

    /// Creates a retrieval error.
    pub fn retrieval(message: impl fmt::Display) -> Self {
        Self::Retrieval(message.to_string())
    }

    /// Creates a configuration error.
    pub fn config(message: impl fmt::Display) -> Self {
        Self::Config(message.to_string())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider { .. } | Self::Io(_) => true,
            Self::Database(e) => e.is_transient(),
            _ => false,
        }
    }
}
