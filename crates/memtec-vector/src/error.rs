//! Vector index error types.

use thiserror::Error;

/// Result type for vector index operations.
pub type VectorResult<T> = Result<T, VectorError>;

/// Vector index errors.
#[derive(Debug, Error)]
pub enum VectorError {
    /// Document or chunk not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Vector dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Underlying database error.
    #[error("database error: {0}")]
    Database(#[from] memtec_postgres::PgError),

    /// Backend-specific error.
    #[error("backend error: {0}")]
    Backend(String),
}

impl VectorError {
    /// Creates a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Creates an invalid config error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Creates a dimension mismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Creates a backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
