use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{ChunkRecord, DocumentRecord};
use crate::domain::errors::{Result, RetrievalError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    /// Fails with `AlreadyIngested` when the document exists.
    CreateOnly,
    /// Appends after the document's last chunk, creating it when missing.
    Append,
}

/// One document's worth of chunks, committed all-or-nothing.
#[derive(Debug, Clone)]
pub struct IngestBatch {
    pub document: DocumentRecord,
    pub mode: BatchMode,
    pub chunks: Vec<ChunkRecord>,
}

#[derive(Debug, Clone)]
pub struct CommittedBatch {
    pub document: DocumentRecord,
    pub document_created: bool,
    pub chunks: Vec<ChunkRecord>,
}

#[derive(Debug, Clone)]
pub struct DeletedDocument {
    pub document: DocumentRecord,
    pub chunks_removed: usize,
}

/// Durable keyed storage of documents and their chunks.
///
/// Every mutation is atomic with respect to readers: a reader sees either
/// none or all of a batch, and either the whole document or nothing of it.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Corpus dimension, once the first chunk (or configuration) fixed it.
    async fn dimension(&self) -> Result<Option<usize>>;

    async fn put(&self, chunk: &ChunkRecord) -> Result<()>;

    /// Creates the document (unless appending) and stores every chunk, or
    /// nothing. Chunks get consecutive `chunk_index` values after any the
    /// document already has.
    async fn write_batch(&self, batch: IngestBatch) -> Result<CommittedBatch>;

    async fn find_document(&self, file_id: Uuid) -> Result<Option<DocumentRecord>>;

    /// Chunks of one document in insertion order; empty when unknown.
    async fn get_by_document(&self, file_id: Uuid) -> Result<Vec<ChunkRecord>>;

    /// Search candidates for a user, optionally narrowed to one document.
    async fn get_by_user(&self, user_id: &str, file_id: Option<Uuid>)
    -> Result<Vec<ChunkRecord>>;

    /// Newest first.
    async fn list_documents(&self, user_id: &str) -> Result<Vec<DocumentRecord>>;

    async fn delete_document(
        &self,
        file_id: Uuid,
        requesting_user_id: &str,
    ) -> Result<DeletedDocument>;

    async fn count(&self) -> Result<usize>;

    async fn count_by_user(&self, user_id: &str) -> Result<usize>;
}

/// Checks a chunk against the corpus dimension, if one is established.
pub fn check_dimension(established: Option<usize>, actual: usize) -> Result<()> {
    match established {
        Some(expected) if expected != actual => {
            Err(RetrievalError::DimensionMismatch { expected, actual })
        }
        _ => Ok(()),
    }
}

/// Checks that a chunk belongs to `document` and carries its owner.
pub fn check_chunk_owner(document: &DocumentRecord, chunk: &ChunkRecord) -> Result<()> {
    if chunk.file_id() != document.file_id() {
        return Err(RetrievalError::invalid_argument(format!(
            "chunk {} belongs to {}, not {}",
            chunk.chunk_id(),
            chunk.file_id(),
            document.file_id()
        )));
    }

    if !document.is_owned_by(chunk.user_id()) {
        return Err(RetrievalError::NotOwner {
            file_id: document.file_id(),
            user_id: chunk.user_id().to_string(),
        });
    }

    Ok(())
}
