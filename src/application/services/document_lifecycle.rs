use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::entities::{ChunkRecord, DocumentRecord};
use crate::domain::errors::{Result, RetrievalError};
use crate::domain::repositories::{ChunkStore, DeletedDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub documents: usize,
    pub chunks: usize,
}

pub struct DocumentLifecycleService {
    chunk_store: Arc<dyn ChunkStore>,
}

impl DocumentLifecycleService {
    pub fn new(chunk_store: Arc<dyn ChunkStore>) -> Self {
        Self { chunk_store }
    }

    /// Removes the document and every chunk of it in one step. Only the
    /// owner may delete.
    pub async fn delete_document(
        &self,
        file_id: Uuid,
        requesting_user_id: &str,
    ) -> Result<DeletedDocument> {
        let deleted = self
            .chunk_store
            .delete_document(file_id, requesting_user_id)
            .await
            .inspect_err(|e| {
                warn!(%file_id, user_id = requesting_user_id, error = %e, "Refused document deletion");
            })?;

        info!(
            %file_id,
            user_id = requesting_user_id,
            chunks_removed = deleted.chunks_removed,
            "Deleted document"
        );
        Ok(deleted)
    }

    /// Newest first.
    pub async fn list_documents(&self, user_id: &str) -> Result<Vec<DocumentRecord>> {
        self.chunk_store.list_documents(user_id).await
    }

    pub async fn list_documents_page(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<DocumentRecord>> {
        if limit == 0 {
            return Err(RetrievalError::invalid_argument("limit must be at least 1"));
        }

        let mut documents = self.chunk_store.list_documents(user_id).await?;
        documents.truncate(limit);
        Ok(documents)
    }

    pub async fn get_document(&self, file_id: Uuid, user_id: &str) -> Result<DocumentRecord> {
        let document = self
            .chunk_store
            .find_document(file_id)
            .await?
            .ok_or(RetrievalError::NotFound(file_id))?;

        if !document.is_owned_by(user_id) {
            return Err(RetrievalError::NotOwner {
                file_id,
                user_id: user_id.to_string(),
            });
        }
        Ok(document)
    }

    pub async fn document_chunks(&self, file_id: Uuid, user_id: &str) -> Result<Vec<ChunkRecord>> {
        self.get_document(file_id, user_id).await?;
        self.chunk_store.get_by_document(file_id).await
    }

    /// All chunk texts of the document in order, separated by blank lines.
    pub async fn document_text(&self, file_id: Uuid, user_id: &str) -> Result<String> {
        let chunks = self.document_chunks(file_id, user_id).await?;
        let texts: Vec<&str> = chunks.iter().map(ChunkRecord::text).collect();
        Ok(texts.join("\n\n"))
    }

    pub async fn user_stats(&self, user_id: &str) -> Result<UserStats> {
        let documents = self.chunk_store.list_documents(user_id).await?.len();
        let chunks = self.chunk_store.count_by_user(user_id).await?;
        Ok(UserStats { documents, chunks })
    }
}
