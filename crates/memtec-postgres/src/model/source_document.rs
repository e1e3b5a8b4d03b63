//! Source document model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::source_documents;

/// A registered source document (a past tender memoir).
///
/// `indexed` flips to true only once every chunk of the document has an
/// embedding stored, so a partially indexed document is never reported as
/// searchable.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = source_documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SourceDocument {
    /// Unique document identifier.
    pub id: Uuid,
    /// Original filename as uploaded.
    pub filename: String,
    /// Path of the stored blob in the storage backend.
    pub storage_path: String,
    /// Client the tender was submitted to.
    pub client: Option<String>,
    /// Year of the tender.
    pub year: Option<i32>,
    /// Whether all chunks of this document carry embeddings.
    pub indexed: bool,
    /// Additional metadata (JSON).
    pub metadata: serde_json::Value,
    /// Timestamp when the document was registered.
    pub created_at: Timestamp,
    /// Timestamp when the document was last updated.
    pub updated_at: Timestamp,
}

/// Data for registering a new source document.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = source_documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewSourceDocument {
    /// Original filename (required).
    pub filename: String,
    /// Storage path of the blob (required).
    pub storage_path: String,
    /// Client name.
    pub client: Option<String>,
    /// Tender year.
    pub year: Option<i32>,
    /// Metadata.
    pub metadata: Option<serde_json::Value>,
}

/// Data for updating a source document.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = source_documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateSourceDocument {
    /// Client name.
    pub client: Option<String>,
    /// Tender year.
    pub year: Option<i32>,
    /// Indexed flag.
    pub indexed: Option<bool>,
    /// Metadata.
    pub metadata: Option<serde_json::Value>,
}

impl SourceDocument {
    /// Returns whether the document has custom metadata.
    pub fn has_metadata(&self) -> bool {
        !self.metadata.as_object().is_none_or(|obj| obj.is_empty())
    }

    /// Registration timestamp.
    pub fn created_at(&self) -> jiff::Timestamp {
        self.created_at.into()
    }
}
