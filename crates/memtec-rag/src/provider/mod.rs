//! Embedding providers.

mod embedder;
mod mock;
mod openai;

pub use embedder::{Embedder, EmbeddingBackend, MAX_BATCH_DOCUMENTS, MAX_DOCUMENT_CHARS};
pub use mock::MockEmbedder;
pub use openai::{DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MODEL, OpenAiEmbedder};
