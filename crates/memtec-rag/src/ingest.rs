//! Document lifecycle: upload, extraction, indexing, deletion.

use std::sync::Arc;

use memtec_extract::DocumentExtractor;
use memtec_opendal::{ScratchFile, StorageBackend, storage_path, validate_upload};
use memtec_postgres::PgClient;
use memtec_postgres::model::{NewSourceDocument, SourceDocument, UpdateSourceDocument};
use memtec_postgres::query::SourceDocumentRepository;
use uuid::Uuid;

use crate::TRACING_TARGET;
use crate::config::RagConfig;
use crate::indexer::{IndexReport, Indexer};
use crate::{Error, Result};

/// Outcome of ingesting one document.
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// The ingested document.
    pub document: SourceDocument,
    /// Characters of cleaned text extracted from the source.
    pub char_count: usize,
    /// Outcome of chunking and embedding.
    pub index: IndexReport,
}

/// Document ingestion service.
///
/// Owns the full path from an uploaded blob to searchable chunks:
/// validation, blob storage, registration, text extraction, chunking,
/// and embedding.
pub struct IngestService {
    storage: StorageBackend,
    db: PgClient,
    extractor: Arc<DocumentExtractor>,
    indexer: Indexer,
    storage_prefix: String,
}

impl IngestService {
    /// Creates an ingestion service with the default extractor.
    pub fn new(
        storage: StorageBackend,
        db: PgClient,
        indexer: Indexer,
        config: &RagConfig,
    ) -> Self {
        Self {
            storage,
            db,
            extractor: Arc::new(DocumentExtractor::new()),
            indexer,
            storage_prefix: config.storage_prefix.clone(),
        }
    }

    /// Replaces the document extractor.
    pub fn with_extractor(mut self, extractor: Arc<DocumentExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Validates and stores an uploaded file, registering it as a source
    /// document.
    ///
    /// When no `year` is supplied, one is recovered from the filename if
    /// present. The document starts unindexed; call [`ingest_document`]
    /// to make it searchable.
    ///
    /// [`ingest_document`]: IngestService::ingest_document
    pub async fn register_document(
        &self,
        filename: &str,
        data: &[u8],
        client: Option<String>,
        year: Option<i32>,
    ) -> Result<SourceDocument> {
        validate_upload(filename, data.len() as u64)?;

        let path = storage_path(&self.storage_prefix, filename);
        self.storage.write(&path, data).await?;

        let year = year.or_else(|| memtec_opendal::extract_year(filename));

        let mut conn = self.db.get_connection().await?;
        let document = conn
            .create_source_document(NewSourceDocument {
                filename: filename.to_string(),
                storage_path: path,
                client,
                year,
                metadata: None,
            })
            .await?;

        tracing::info!(
            target: TRACING_TARGET,
            document_id = %document.id,
            filename = %document.filename,
            storage_path = %document.storage_path,
            size = data.len(),
            "Source document registered"
        );

        Ok(document)
    }

    /// Extracts, chunks, and embeds a registered document.
    ///
    /// The stored blob is materialized as a scratch file for the
    /// extension-dispatching parsers; extraction runs on the blocking
    /// thread pool. Re-running replaces any previously indexed chunks.
    pub async fn ingest_document(&self, document_id: Uuid) -> Result<IngestReport> {
        let mut conn = self.db.get_connection().await?;
        let document = conn
            .find_source_document(document_id)
            .await?
            .ok_or(Error::DocumentNotFound(document_id))?;
        drop(conn);

        let data = self.storage.read(&document.storage_path).await?;

        let filename = document.filename.clone();
        let extractor = Arc::clone(&self.extractor);
        let extraction = tokio::task::spawn_blocking(move || -> Result<_> {
            let scratch = ScratchFile::create(&filename, &data)?;
            Ok(extractor.extract(scratch.path())?)
        })
        .await
        .map_err(|e| Error::retrieval(format!("extraction task failed: {e}")))??;

        let report = self
            .indexer
            .index_document(document_id, &extraction.full_text)
            .await?;

        let mut metadata = serde_json::json!({
            "char_count": extraction.char_count,
            "page_count": extraction.page_count,
            "paragraph_count": extraction.paragraph_count,
        });
        if !extraction.metadata.is_empty() {
            metadata["source"] = serde_json::to_value(&extraction.metadata)?;
        }

        let mut conn = self.db.get_connection().await?;
        let document = conn
            .update_source_document(
                document_id,
                UpdateSourceDocument {
                    metadata: Some(metadata),
                    ..Default::default()
                },
            )
            .await?;

        Ok(IngestReport {
            document,
            char_count: extraction.char_count,
            index: report,
        })
    }

    /// Lists all registered documents, most recent first.
    pub async fn list_documents(&self) -> Result<Vec<SourceDocument>> {
        let mut conn = self.db.get_connection().await?;
        Ok(conn.list_source_documents().await?)
    }

    /// Finds a registered document.
    pub async fn find_document(&self, document_id: Uuid) -> Result<Option<SourceDocument>> {
        let mut conn = self.db.get_connection().await?;
        Ok(conn.find_source_document(document_id).await?)
    }

    /// Deletes a document, its chunks, and its stored blob.
    ///
    /// A blob already missing from storage is logged and ignored so a
    /// half-deleted document can still be cleaned up.
    pub async fn delete_document(&self, document_id: Uuid) -> Result<()> {
        let mut conn = self.db.get_connection().await?;
        let document = conn
            .find_source_document(document_id)
            .await?
            .ok_or(Error::DocumentNotFound(document_id))?;

        if let Err(e) = self.storage.delete(&document.storage_path).await {
            tracing::warn!(
                target: TRACING_TARGET,
                document_id = %document_id,
                storage_path = %document.storage_path,
                error = %e,
                "Could not delete stored blob, removing database record anyway"
            );
        }

        conn.delete_source_document(document_id).await?;

        tracing::info!(
            target: TRACING_TARGET,
            document_id = %document_id,
            filename = %document.filename,
            "Source document deleted"
        );

        Ok(())
    }
}
