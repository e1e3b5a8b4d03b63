//! Embedding backend trait and request batching.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{Error, Result, TRACING_TARGET};

/// Maximum characters per embedded document.
///
/// Longer texts are truncated before the request; embedding APIs reject
/// over-long inputs and a window this large has lost its retrieval
/// precision anyway.
pub const MAX_DOCUMENT_CHARS: usize = 32_000;

/// Maximum documents per embedding request.
pub const MAX_BATCH_DOCUMENTS: usize = 2_048;

/// A provider capable of embedding batches of text.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Name of the underlying model.
    fn model_name(&self) -> &str;

    /// Dimensions of the produced vectors.
    fn dimensions(&self) -> usize;

    /// Embeds one batch of texts, one vector per input in order.
    ///
    /// Callers are responsible for honoring [`MAX_BATCH_DOCUMENTS`].
    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;
}

/// Batching front-end over an [`EmbeddingBackend`].
///
/// Truncates over-long documents, splits the input into sequential
/// requests of at most [`MAX_BATCH_DOCUMENTS`] texts, and verifies the
/// provider returned one vector per input. Output order always matches
/// input order.
#[derive(Clone)]
pub struct Embedder {
    backend: Arc<dyn EmbeddingBackend>,
}

impl Embedder {
    /// Creates an embedder over the given backend.
    pub fn new(backend: Arc<dyn EmbeddingBackend>) -> Self {
        Self { backend }
    }

    /// Name of the underlying model.
    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    /// Dimensions of the produced vectors.
    pub fn dimensions(&self) -> usize {
        self.backend.dimensions()
    }

    /// Embeds a single text.
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_many(vec![text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::embedding("provider returned no vector for query"))
    }

    /// Embeds many texts, preserving input order.
    ///
    /// An empty input returns an empty result without calling the provider.
    pub async fn embed_many(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let texts: Vec<String> = texts.into_iter().map(truncate_chars).collect();
        let total = texts.len();
        let mut vectors = Vec::with_capacity(total);

        for batch in texts.chunks(MAX_BATCH_DOCUMENTS) {
            let requested = batch.len();
            let embedded = self.backend.embed_batch(batch.to_vec()).await?;

            if embedded.len() != requested {
                return Err(Error::embedding(format!(
                    "embedding count mismatch: expected {requested}, got {}",
                    embedded.len()
                )));
            }

            vectors.extend(embedded);
        }

        tracing::debug!(
            target: TRACING_TARGET,
            model = %self.backend.model_name(),
            documents = total,
            requests = total.div_ceil(MAX_BATCH_DOCUMENTS),
            "Embedded documents"
        );

        Ok(vectors)
    }
}

impl std::fmt::Debug for Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedder")
            .field("model", &self.backend.model_name())
            .field("dimensions", &self.backend.dimensions())
            .finish()
    }
}

fn truncate_chars(text: String) -> String {
    if text.chars().count() <= MAX_DOCUMENT_CHARS {
        return text;
    }
    text.chars().take(MAX_DOCUMENT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockEmbedder;

    #[tokio::test]
    async fn empty_input_makes_no_request() {
        let backend = Arc::new(MockEmbedder::new(4));
        let embedder = Embedder::new(backend.clone());

        let vectors = embedder.embed_many(vec![]).await.unwrap();
        assert!(vectors.is_empty());
        assert!(backend.batch_sizes().is_empty());
    }

    #[tokio::test]
    async fn large_inputs_split_into_sequential_requests() {
        let backend = Arc::new(MockEmbedder::new(4));
        let embedder = Embedder::new(backend.clone());

        let texts: Vec<String> = (0..5000).map(|i| format!("texte {i}")).collect();
        let vectors = embedder.embed_many(texts).await.unwrap();

        assert_eq!(vectors.len(), 5000);
        assert_eq!(backend.batch_sizes(), vec![2048, 2048, 904]);
    }

    #[tokio::test]
    async fn output_order_matches_input_order() {
        let backend = Arc::new(MockEmbedder::new(4));
        let embedder = Embedder::new(backend.clone());

        let texts: Vec<String> = (0..2500).map(|i| "x".repeat(i + 1)).collect();
        let vectors = embedder.embed_many(texts).await.unwrap();

        // The mock encodes input length in the second component.
        for (i, vector) in vectors.iter().enumerate() {
            assert_eq!(vector[1], (i + 1) as f32);
        }
    }

    #[tokio::test]
    async fn overlong_documents_are_truncated_to_char_budget() {
        let backend = Arc::new(MockEmbedder::new(4));
        let embedder = Embedder::new(backend.clone());

        // Multibyte characters: truncation must count chars, not bytes.
        let long = "é".repeat(MAX_DOCUMENT_CHARS + 500);
        let vectors = embedder.embed_many(vec![long]).await.unwrap();

        assert_eq!(vectors[0][1], MAX_DOCUMENT_CHARS as f32);
    }

    #[tokio::test]
    async fn count_mismatch_is_an_error() {
        let backend = Arc::new(MockEmbedder::new(4).with_short_responses());
        let embedder = Embedder::new(backend);

        let texts = vec!["un".to_string(), "deux".to_string()];
        let err = embedder.embed_many(texts).await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }
}
