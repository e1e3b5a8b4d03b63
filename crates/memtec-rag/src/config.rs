//! Retrieval pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Configuration for the retrieval pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Chunk window size in characters.
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,

    /// Number of chunks embedded and stored per indexing round.
    pub embedding_batch_size: usize,

    /// Maximum chunks to retrieve per query.
    pub max_results: usize,

    /// Minimum similarity score (0.0 to 1.0). If `None`, no filtering is
    /// applied.
    pub min_score: Option<f64>,

    /// Directory prefix for stored source documents.
    pub storage_prefix: String,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 100,
            embedding_batch_size: 100,
            max_results: 10,
            min_score: None,
            storage_prefix: "memoires".to_string(),
        }
    }
}

impl RagConfig {
    /// Validates the configuration.
    ///
    /// The overlap must be strictly smaller than the chunk size, otherwise
    /// the splitter would never advance.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::config("chunk_size must be greater than zero"));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }

        if self.embedding_batch_size == 0 {
            return Err(Error::config(
                "embedding_batch_size must be greater than zero",
            ));
        }

        if let Some(min_score) = self.min_score
            && !(0.0..=1.0).contains(&min_score)
        {
            return Err(Error::config(format!(
                "min_score must be between 0.0 and 1.0, got {min_score}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        RagConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_overlap_not_smaller_than_chunk_size() {
        let config = RagConfig {
            chunk_size: 100,
            chunk_overlap: 100,
            ..RagConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_out_of_range_min_score() {
        let config = RagConfig {
            min_score: Some(1.5),
            ..RagConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
