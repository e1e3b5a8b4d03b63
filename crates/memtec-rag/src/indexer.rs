//! Chunk indexing pipeline.
//!
//! Splits extracted text, replaces the document's chunks atomically, then
//! embeds and stores vectors in batches. A document is only flagged as
//! indexed once every one of its chunks carries an embedding; batch
//! failures are skipped and reported instead of aborting the run.

use std::sync::Arc;

use memtec_vector::{ChunkRecord, VectorIndexBackend};
use uuid::Uuid;

use crate::TRACING_TARGET;
use crate::config::RagConfig;
use crate::provider::Embedder;
use crate::splitter::Splitter;
use crate::{Error, Result};

/// Outcome of indexing one document.
#[derive(Debug, Clone)]
pub struct IndexReport {
    /// Document that was indexed.
    pub document_id: Uuid,
    /// Number of chunks produced by the splitter.
    pub requested: usize,
    /// Number of chunks whose embedding was stored.
    pub succeeded: usize,
    /// Indexes of chunks that failed to embed or store.
    pub failed: Vec<u32>,
}

impl IndexReport {
    /// Returns whether every produced chunk was embedded and stored.
    ///
    /// An empty document is never complete; it has nothing searchable.
    pub fn is_complete(&self) -> bool {
        self.requested > 0 && self.failed.is_empty()
    }
}

/// Indexer for batch-embedding and storing document chunks.
pub struct Indexer {
    embedder: Embedder,
    index: Arc<dyn VectorIndexBackend>,
    splitter: Splitter,
    batch_size: usize,
}

impl Indexer {
    /// Creates an indexer from pipeline configuration.
    pub fn new(
        embedder: Embedder,
        index: Arc<dyn VectorIndexBackend>,
        config: &RagConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            embedder,
            index,
            splitter: Splitter::from_config(config)?,
            batch_size: config.embedding_batch_size,
        })
    }

    /// Returns the splitter used by this indexer.
    pub fn splitter(&self) -> &Splitter {
        &self.splitter
    }

    /// Splits, stores, and embeds a document's text.
    ///
    /// Existing chunks are replaced atomically before embedding starts, so
    /// the document's indexed flag is reset until this run completes in
    /// full. Embedding failures are reported per chunk, never silently
    /// dropped.
    pub async fn index_document(&self, document_id: Uuid, text: &str) -> Result<IndexReport> {
        let chunks = self.splitter.split(text);
        let total = chunks.len();

        let records: Vec<ChunkRecord> = chunks
            .iter()
            .map(|chunk| {
                ChunkRecord::new(
                    chunk.chunk_index,
                    chunk.content.clone(),
                    (chunk.char_start, chunk.char_end),
                )
                .with_metadata(serde_json::json!({
                    "document_id": document_id,
                    "chunk_index": chunk.chunk_index,
                    "total_chunks": total,
                    "char_start": chunk.char_start,
                    "char_end": chunk.char_end,
                }))
            })
            .collect();

        let stored = self.index.replace_chunks(document_id, records).await?;

        let mut report = IndexReport {
            document_id,
            requested: total,
            succeeded: 0,
            failed: Vec::new(),
        };

        for batch in stored.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|chunk| chunk.content.clone()).collect();

            let vectors = match self.embedder.embed_many(texts).await {
                Ok(vectors) => vectors,
                Err(e) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        document_id = %document_id,
                        chunks = batch.len(),
                        error = %e,
                        "Embedding batch failed, skipping"
                    );
                    report
                        .failed
                        .extend(batch.iter().map(|chunk| chunk.chunk_index));
                    continue;
                }
            };

            if vectors.len() != batch.len() {
                return Err(Error::embedding(format!(
                    "embedding count mismatch: expected {}, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }

            for (chunk, vector) in batch.iter().zip(vectors) {
                match self.index.set_embedding(chunk.id, vector).await {
                    Ok(()) => report.succeeded += 1,
                    Err(e) => {
                        tracing::warn!(
                            target: TRACING_TARGET,
                            document_id = %document_id,
                            chunk_index = chunk.chunk_index,
                            error = %e,
                            "Failed to store embedding, skipping chunk"
                        );
                        report.failed.push(chunk.chunk_index);
                    }
                }
            }
        }

        if report.is_complete() {
            self.index.mark_indexed(document_id, true).await?;
        }

        tracing::info!(
            target: TRACING_TARGET,
            document_id = %document_id,
            requested = report.requested,
            succeeded = report.succeeded,
            failed = report.failed.len(),
            complete = report.is_complete(),
            "Document indexing finished"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use memtec_vector::MemoryBackend;

    use super::*;
    use crate::provider::MockEmbedder;

    fn config() -> RagConfig {
        RagConfig {
            chunk_size: 50,
            chunk_overlap: 10,
            embedding_batch_size: 2,
            ..RagConfig::default()
        }
    }

    fn indexer_with(
        backend: Arc<MockEmbedder>,
        index: Arc<MemoryBackend>,
    ) -> Indexer {
        Indexer::new(Embedder::new(backend), index, &config()).unwrap()
    }

    #[tokio::test]
    async fn full_run_marks_document_indexed() {
        let index = Arc::new(MemoryBackend::new(4));
        let indexer = indexer_with(Arc::new(MockEmbedder::new(4)), index.clone());
        let document_id = Uuid::new_v4();

        let text = "Présentation des moyens humains et matériels du groupement. ".repeat(5);
        let report = indexer.index_document(document_id, &text).await.unwrap();

        assert!(report.requested > 0);
        assert!(report.is_complete());
        assert_eq!(report.succeeded, report.requested);
        assert!(index.is_indexed(document_id).await);
        assert!(index.is_fully_embedded(document_id).await.unwrap());
    }

    #[tokio::test]
    async fn failed_batches_are_skipped_and_reported() {
        let index = Arc::new(MemoryBackend::new(4));
        let backend = Arc::new(MockEmbedder::new(4).fail_on_call(0));
        let indexer = indexer_with(backend, index.clone());
        let document_id = Uuid::new_v4();

        // Enough text for more than one batch of two chunks.
        let text = "contenu de chantier assez long pour plusieurs fenetres ".repeat(10);
        let report = indexer.index_document(document_id, &text).await.unwrap();

        assert!(!report.failed.is_empty());
        assert!(report.succeeded < report.requested);
        assert!(!report.is_complete());
        assert!(!index.is_indexed(document_id).await);
    }

    #[tokio::test]
    async fn empty_text_is_never_marked_indexed() {
        let index = Arc::new(MemoryBackend::new(4));
        let indexer = indexer_with(Arc::new(MockEmbedder::new(4)), index.clone());
        let document_id = Uuid::new_v4();

        let report = indexer.index_document(document_id, "   ").await.unwrap();

        assert_eq!(report.requested, 0);
        assert!(!report.is_complete());
        assert!(!index.is_indexed(document_id).await);
    }

    #[tokio::test]
    async fn reindexing_replaces_previous_chunks() {
        let index = Arc::new(MemoryBackend::new(4));
        let indexer = indexer_with(Arc::new(MockEmbedder::new(4)), index.clone());
        let document_id = Uuid::new_v4();

        indexer
            .index_document(document_id, &"ancien contenu du memoire ".repeat(10))
            .await
            .unwrap();
        let report = indexer
            .index_document(document_id, "nouveau contenu")
            .await
            .unwrap();

        assert_eq!(report.requested, 1);
        let chunks = index.list_chunks(document_id).await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "nouveau contenu");
    }

    #[tokio::test]
    async fn chunk_metadata_records_position_and_total() {
        let index = Arc::new(MemoryBackend::new(4));
        let indexer = indexer_with(Arc::new(MockEmbedder::new(4)), index.clone());
        let document_id = Uuid::new_v4();

        let text = "a".repeat(120);
        indexer.index_document(document_id, &text).await.unwrap();

        let chunks = index.list_chunks(document_id).await.unwrap();
        assert_eq!(chunks.len(), 3);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata["chunk_index"], i);
            assert_eq!(chunk.metadata["total_chunks"], 3);
        }
    }
}
