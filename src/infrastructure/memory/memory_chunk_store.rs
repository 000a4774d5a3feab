use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::domain::entities::{ChunkRecord, DocumentRecord};
use crate::domain::errors::{Result, RetrievalError};
use crate::domain::repositories::{
    BatchMode, ChunkStore, CommittedBatch, DeletedDocument, IngestBatch, check_chunk_owner,
    check_dimension,
};

#[derive(Debug, Default)]
struct MemoryState {
    dimension: Option<usize>,
    documents: HashMap<Uuid, DocumentRecord>,
    /// Chunks per document, kept in `chunk_index` order.
    chunks: HashMap<Uuid, Vec<ChunkRecord>>,
    /// Live and retired ids.
    known_chunk_ids: HashSet<Uuid>,
}

impl MemoryState {
    fn chunk_count(&self) -> usize {
        self.chunks.values().map(Vec::len).sum()
    }
}

/// Ephemeral `ChunkStore`. A single lock guards the whole corpus, so every
/// read sees either all or none of a mutation.
#[derive(Debug, Default)]
pub struct MemoryChunkStore {
    state: RwLock<MemoryState>,
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                dimension: Some(dimension),
                ..MemoryState::default()
            }),
        }
    }
}

#[async_trait]
impl ChunkStore for MemoryChunkStore {
    async fn dimension(&self) -> Result<Option<usize>> {
        Ok(self.state.read().dimension)
    }

    async fn put(&self, chunk: &ChunkRecord) -> Result<()> {
        let mut state = self.state.write();

        let document = state
            .documents
            .get(&chunk.file_id())
            .ok_or(RetrievalError::NotFound(chunk.file_id()))?;
        check_chunk_owner(document, chunk)?;
        check_dimension(state.dimension, chunk.dimension())?;
        if state.known_chunk_ids.contains(&chunk.chunk_id()) {
            return Err(RetrievalError::DuplicateId(chunk.chunk_id()));
        }

        let siblings = state.chunks.entry(chunk.file_id()).or_default();
        let position = match siblings
            .binary_search_by_key(&chunk.chunk_index(), ChunkRecord::chunk_index)
        {
            Ok(_) => {
                return Err(RetrievalError::invalid_argument(format!(
                    "document {} already has a chunk at index {}",
                    chunk.file_id(),
                    chunk.chunk_index()
                )));
            }
            Err(position) => position,
        };
        siblings.insert(position, chunk.clone());

        state.dimension.get_or_insert(chunk.dimension());
        state.known_chunk_ids.insert(chunk.chunk_id());
        Ok(())
    }

    async fn write_batch(&self, batch: IngestBatch) -> Result<CommittedBatch> {
        let IngestBatch {
            document,
            mode,
            mut chunks,
        } = batch;
        let file_id = document.file_id();

        if chunks.is_empty() {
            return Err(RetrievalError::invalid_argument(
                "a batch must contain at least one chunk",
            ));
        }

        let mut state = self.state.write();

        // Everything is checked before the first mutation.
        let (document, document_created, first_index) = match state.documents.get(&file_id) {
            None => (document, true, 0),
            Some(_) if mode == BatchMode::CreateOnly => {
                return Err(RetrievalError::AlreadyIngested(file_id));
            }
            Some(existing) => {
                if !existing.is_owned_by(document.user_id()) {
                    return Err(RetrievalError::NotOwner {
                        file_id,
                        user_id: document.user_id().to_string(),
                    });
                }
                let first_index = state
                    .chunks
                    .get(&file_id)
                    .and_then(|siblings| siblings.last())
                    .map_or(0, |last| last.chunk_index() + 1);
                (existing.clone(), false, first_index)
            }
        };

        let mut dimension = state.dimension;
        let mut batch_ids = HashSet::with_capacity(chunks.len());
        for (offset, chunk) in chunks.iter_mut().enumerate() {
            let index = u32::try_from(offset)
                .ok()
                .and_then(|offset| first_index.checked_add(offset))
                .ok_or_else(|| RetrievalError::invalid_argument("document has too many chunks"))?;
            chunk.set_chunk_index(index);
            check_chunk_owner(&document, chunk)?;
            check_dimension(dimension, chunk.dimension())?;
            dimension = Some(chunk.dimension());

            if state.known_chunk_ids.contains(&chunk.chunk_id())
                || !batch_ids.insert(chunk.chunk_id())
            {
                return Err(RetrievalError::DuplicateId(chunk.chunk_id()));
            }
        }

        state.dimension = dimension;
        state.known_chunk_ids.extend(batch_ids);
        state
            .chunks
            .entry(file_id)
            .or_default()
            .extend(chunks.iter().cloned());
        if document_created {
            state.documents.insert(file_id, document.clone());
        }

        Ok(CommittedBatch {
            document,
            document_created,
            chunks,
        })
    }

    async fn find_document(&self, file_id: Uuid) -> Result<Option<DocumentRecord>> {
        Ok(self.state.read().documents.get(&file_id).cloned())
    }

    async fn get_by_document(&self, file_id: Uuid) -> Result<Vec<ChunkRecord>> {
        Ok(self
            .state
            .read()
            .chunks
            .get(&file_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_by_user(
        &self,
        user_id: &str,
        file_id: Option<Uuid>,
    ) -> Result<Vec<ChunkRecord>> {
        let mut candidates: Vec<ChunkRecord> = {
            let state = self.state.read();
            state
                .chunks
                .iter()
                .filter(|(id, _)| file_id.is_none_or(|wanted| wanted == **id))
                .flat_map(|(_, siblings)| siblings.iter())
                .filter(|chunk| chunk.user_id() == user_id)
                .cloned()
                .collect()
        };

        candidates.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.file_id().cmp(&b.file_id()))
                .then_with(|| a.chunk_index().cmp(&b.chunk_index()))
        });
        Ok(candidates)
    }

    async fn list_documents(&self, user_id: &str) -> Result<Vec<DocumentRecord>> {
        let mut documents: Vec<DocumentRecord> = self
            .state
            .read()
            .documents
            .values()
            .filter(|document| document.is_owned_by(user_id))
            .cloned()
            .collect();

        documents.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.file_id().cmp(&b.file_id()))
        });
        Ok(documents)
    }

    async fn delete_document(
        &self,
        file_id: Uuid,
        requesting_user_id: &str,
    ) -> Result<DeletedDocument> {
        let mut state = self.state.write();

        let document = state
            .documents
            .get(&file_id)
            .ok_or(RetrievalError::NotFound(file_id))?;
        if !document.is_owned_by(requesting_user_id) {
            return Err(RetrievalError::NotOwner {
                file_id,
                user_id: requesting_user_id.to_string(),
            });
        }

        let document = state
            .documents
            .remove(&file_id)
            .ok_or(RetrievalError::NotFound(file_id))?;
        let removed = state.chunks.remove(&file_id).unwrap_or_default();

        Ok(DeletedDocument {
            document,
            chunks_removed: removed.len(),
        })
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.state.read().chunk_count())
    }

    async fn count_by_user(&self, user_id: &str) -> Result<usize> {
        let state = self.state.read();
        Ok(state
            .chunks
            .values()
            .flatten()
            .filter(|chunk| chunk.user_id() == user_id)
            .count())
    }
}
