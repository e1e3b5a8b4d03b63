//! Source document repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewSourceDocument, SourceDocument, UpdateSourceDocument};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for source document database operations.
pub trait SourceDocumentRepository {
    /// Registers a new source document.
    fn create_source_document(
        &mut self,
        new_document: NewSourceDocument,
    ) -> impl Future<Output = PgResult<SourceDocument>> + Send;

    /// Finds a document by its identifier.
    fn find_source_document(
        &mut self,
        document_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<SourceDocument>>> + Send;

    /// Finds a document by its storage path.
    fn find_source_document_by_path(
        &mut self,
        storage_path: &str,
    ) -> impl Future<Output = PgResult<Option<SourceDocument>>> + Send;

    /// Lists all registered documents, most recent first.
    fn list_source_documents(
        &mut self,
    ) -> impl Future<Output = PgResult<Vec<SourceDocument>>> + Send;

    /// Updates a document with new data.
    fn update_source_document(
        &mut self,
        document_id: Uuid,
        updates: UpdateSourceDocument,
    ) -> impl Future<Output = PgResult<SourceDocument>> + Send;

    /// Sets the indexed flag on a document.
    fn mark_document_indexed(
        &mut self,
        document_id: Uuid,
        indexed: bool,
    ) -> impl Future<Output = PgResult<SourceDocument>> + Send;

    /// Deletes a document; its chunks are removed by cascade.
    fn delete_source_document(
        &mut self,
        document_id: Uuid,
    ) -> impl Future<Output = PgResult<usize>> + Send;
}

impl SourceDocumentRepository for PgConnection {
    async fn create_source_document(
        &mut self,
        new_document: NewSourceDocument,
    ) -> PgResult<SourceDocument> {
        use schema::source_documents;

        let document = diesel::insert_into(source_documents::table)
            .values(&new_document)
            .returning(SourceDocument::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(document)
    }

    async fn find_source_document(
        &mut self,
        document_id: Uuid,
    ) -> PgResult<Option<SourceDocument>> {
        use schema::source_documents::{self, dsl};

        let document = source_documents::table
            .filter(dsl::id.eq(document_id))
            .select(SourceDocument::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(document)
    }

    async fn find_source_document_by_path(
        &mut self,
        storage_path: &str,
    ) -> PgResult<Option<SourceDocument>> {
        use schema::source_documents::{self, dsl};

        let document = source_documents::table
            .filter(dsl::storage_path.eq(storage_path))
            .select(SourceDocument::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(document)
    }

    async fn list_source_documents(&mut self) -> PgResult<Vec<SourceDocument>> {
        use schema::source_documents::{self, dsl};

        let documents = source_documents::table
            .order(dsl::created_at.desc())
            .select(SourceDocument::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(documents)
    }

    async fn update_source_document(
        &mut self,
        document_id: Uuid,
        updates: UpdateSourceDocument,
    ) -> PgResult<SourceDocument> {
        use schema::source_documents::{self, dsl};

        let document = diesel::update(source_documents::table.filter(dsl::id.eq(document_id)))
            .set((&updates, dsl::updated_at.eq(diesel::dsl::now)))
            .returning(SourceDocument::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(document)
    }

    async fn mark_document_indexed(
        &mut self,
        document_id: Uuid,
        indexed: bool,
    ) -> PgResult<SourceDocument> {
        use schema::source_documents::{self, dsl};

        let document = diesel::update(source_documents::table.filter(dsl::id.eq(document_id)))
            .set((dsl::indexed.eq(indexed), dsl::updated_at.eq(diesel::dsl::now)))
            .returning(SourceDocument::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(document)
    }

    async fn delete_source_document(&mut self, document_id: Uuid) -> PgResult<usize> {
        use schema::source_documents::{self, dsl};

        let affected = diesel::delete(source_documents::table.filter(dsl::id.eq(document_id)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(affected)
    }
}
