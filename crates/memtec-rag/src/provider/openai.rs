//! OpenAI embedding backend via rig.

use async_trait::async_trait;
use rig::embeddings::EmbeddingModel as RigEmbeddingModel;
use rig::prelude::EmbeddingsClient;
use rig::providers::openai;

use super::embedder::EmbeddingBackend;
use crate::{Error, Result};

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Dimensions of the default embedding model.
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;

/// Embedding backend using the OpenAI API.
pub struct OpenAiEmbedder {
    model: openai::EmbeddingModel,
    model_name: String,
    dimensions: usize,
}

impl OpenAiEmbedder {
    /// Creates a backend for `text-embedding-3-small` at 1536 dimensions.
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_model(api_key, DEFAULT_EMBEDDING_MODEL, DEFAULT_EMBEDDING_DIMENSIONS)
    }

    /// Creates a backend for a specific model and dimensionality.
    pub fn with_model(api_key: &str, model: &str, dimensions: usize) -> Result<Self> {
        let client =
            openai::Client::new(api_key).map_err(|e| Error::provider("openai", e.to_string()))?;

        Ok(Self {
            model: client.embedding_model_with_ndims(model, dimensions),
            model_name: model.to_string(),
            dimensions,
        })
    }
}

#[async_trait]
impl EmbeddingBackend for OpenAiEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let embeddings = self
            .model
            .embed_texts(texts)
            .await
            .map_err(|e| Error::provider("openai", e.to_string()))?;

        Ok(embeddings
            .into_iter()
            .map(|embedding| embedding.vec.iter().map(|&x| x as f32).collect())
            .collect())
    }
}

impl std::fmt::Debug for OpenAiEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEmbedder")
            .field("model", &self.model_name)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}
