use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::entities::{ChunkRecord, DocumentRecord, current_timestamp};
use crate::domain::errors::{Result, RetrievalError};
use crate::domain::repositories::{BatchMode, ChunkStore, IngestBatch, check_dimension};
use crate::domain::value_objects::{DocumentMetadata, EmbeddingVector};

/// One chunk as handed over by the caller: text plus its precomputed vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkInput {
    pub text: String,
    pub embedding: Vec<f32>,
    pub page_number: Option<u32>,
}

impl ChunkInput {
    pub fn new(text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            text: text.into(),
            embedding,
            page_number: None,
        }
    }

    pub fn with_page(mut self, page_number: u32) -> Self {
        self.page_number = Some(page_number);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub file_id: Uuid,
    pub document_created: bool,
    /// Ids of the stored chunks, in `chunk_index` order.
    pub chunk_ids: Vec<Uuid>,
}

pub struct IngestionService {
    chunk_store: Arc<dyn ChunkStore>,
    append_mode: bool,
}

impl IngestionService {
    pub fn new(chunk_store: Arc<dyn ChunkStore>, append_mode: bool) -> Self {
        Self {
            chunk_store,
            append_mode,
        }
    }

    pub fn append_mode(&self) -> bool {
        self.append_mode
    }

    pub async fn ingest(
        &self,
        file_id: Uuid,
        file_name: &str,
        user_id: &str,
        chunks: Vec<ChunkInput>,
    ) -> Result<IngestReport> {
        self.ingest_with_metadata(file_id, file_name, user_id, None, chunks)
            .await
    }

    /// Stores every chunk of `chunks` under `file_id`, or none of them.
    pub async fn ingest_with_metadata(
        &self,
        file_id: Uuid,
        file_name: &str,
        user_id: &str,
        metadata: Option<DocumentMetadata>,
        chunks: Vec<ChunkInput>,
    ) -> Result<IngestReport> {
        let chunk_count = chunks.len();

        let result = self
            .build_batch(file_id, file_name, user_id, metadata, chunks)
            .await;
        let committed = match result {
            Ok(batch) => self.chunk_store.write_batch(batch).await,
            Err(e) => Err(e),
        }
        .inspect_err(|e| {
            warn!(%file_id, user_id, chunks = chunk_count, error = %e, "Rejected ingestion");
        })?;

        info!(
            %file_id,
            user_id,
            chunks = committed.chunks.len(),
            document_created = committed.document_created,
            "Ingested document chunks"
        );

        Ok(IngestReport {
            file_id,
            document_created: committed.document_created,
            chunk_ids: committed.chunks.iter().map(ChunkRecord::chunk_id).collect(),
        })
    }

    async fn build_batch(
        &self,
        file_id: Uuid,
        file_name: &str,
        user_id: &str,
        metadata: Option<DocumentMetadata>,
        chunks: Vec<ChunkInput>,
    ) -> Result<IngestBatch> {
        if user_id.trim().is_empty() {
            return Err(RetrievalError::invalid_argument("user_id must not be empty"));
        }
        if file_name.trim().is_empty() {
            return Err(RetrievalError::invalid_argument("file_name must not be empty"));
        }
        if chunks.is_empty() {
            return Err(RetrievalError::invalid_argument(
                "at least one chunk is required",
            ));
        }

        let created_at = current_timestamp();
        let mut records = Vec::with_capacity(chunks.len());
        let mut batch_dimension = None;

        for (position, input) in chunks.into_iter().enumerate() {
            let embedding = EmbeddingVector::new(input.embedding)?;
            check_dimension(batch_dimension, embedding.dimension())?;
            batch_dimension = Some(embedding.dimension());

            let chunk_index = u32::try_from(position)
                .map_err(|_| RetrievalError::invalid_argument("too many chunks in one call"))?;
            records.push(ChunkRecord::new(
                file_id,
                user_id.to_string(),
                chunk_index,
                input.text,
                embedding,
                input.page_number,
                created_at,
            )?);
        }

        // The store repeats this check atomically; this one fails fast.
        if let Some(dimension) = batch_dimension {
            check_dimension(self.chunk_store.dimension().await?, dimension)?;
        }

        Ok(IngestBatch {
            document: DocumentRecord::restore(
                file_id,
                user_id.to_string(),
                file_name.to_string(),
                metadata,
                created_at,
            ),
            mode: if self.append_mode {
                BatchMode::Append
            } else {
                BatchMode::CreateOnly
            },
            chunks: records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::MemoryChunkStore;

    fn service(append_mode: bool) -> (Arc<MemoryChunkStore>, IngestionService) {
        let store = Arc::new(MemoryChunkStore::new());
        let service = IngestionService::new(store.clone(), append_mode);
        (store, service)
    }

    #[tokio::test]
    async fn test_ingest_creates_document_and_chunks() {
        let (store, service) = service(false);
        let file_id = Uuid::new_v4();

        let report = service
            .ingest(
                file_id,
                "lecture.pdf",
                "alice",
                vec![
                    ChunkInput::new("first", vec![1.0, 0.0]).with_page(1),
                    ChunkInput::new("second", vec![0.0, 1.0]).with_page(2),
                ],
            )
            .await
            .unwrap();

        assert!(report.document_created);
        assert_eq!(report.chunk_ids.len(), 2);

        let stored = store.get_by_document(file_id).await.unwrap();
        assert_eq!(stored[0].text(), "first");
        assert_eq!(stored[1].page_number(), Some(2));
        assert_eq!(stored[1].chunk_id(), report.chunk_ids[1]);
    }

    #[tokio::test]
    async fn test_argument_validation() {
        let (store, service) = service(false);
        let file_id = Uuid::new_v4();
        let one = || vec![ChunkInput::new("text", vec![1.0])];

        let cases = vec![
            service.ingest(file_id, "a.pdf", " ", one()).await,
            service.ingest(file_id, "", "alice", one()).await,
            service.ingest(file_id, "a.pdf", "alice", vec![]).await,
            service
                .ingest(file_id, "a.pdf", "alice", vec![ChunkInput::new("  ", vec![1.0])])
                .await,
            service
                .ingest(file_id, "a.pdf", "alice", vec![ChunkInput::new("text", vec![])])
                .await,
            service
                .ingest(
                    file_id,
                    "a.pdf",
                    "alice",
                    vec![ChunkInput::new("text", vec![f32::NAN])],
                )
                .await,
        ];

        for case in cases {
            assert!(matches!(case, Err(RetrievalError::InvalidArgument(_))));
        }
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mixed_dimensions_rejected_atomically() {
        let (store, service) = service(false);
        let file_id = Uuid::new_v4();

        let result = service
            .ingest(
                file_id,
                "a.pdf",
                "alice",
                vec![
                    ChunkInput::new("one", vec![1.0, 0.0, 0.0]),
                    ChunkInput::new("two", vec![1.0, 0.0]),
                ],
            )
            .await;

        assert_eq!(
            result,
            Err(RetrievalError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(store.find_document(file_id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_second_ingest_needs_append_mode() {
        let (_, service) = service(false);
        let file_id = Uuid::new_v4();
        let chunks = || vec![ChunkInput::new("text", vec![1.0, 1.0])];

        service.ingest(file_id, "a.pdf", "alice", chunks()).await.unwrap();
        assert_eq!(
            service.ingest(file_id, "a.pdf", "alice", chunks()).await,
            Err(RetrievalError::AlreadyIngested(file_id))
        );
    }

    #[tokio::test]
    async fn test_append_mode_checks_owner() {
        let (store, service) = service(true);
        let file_id = Uuid::new_v4();
        let chunks = || vec![ChunkInput::new("text", vec![1.0, 1.0])];

        service.ingest(file_id, "a.pdf", "alice", chunks()).await.unwrap();
        let report = service.ingest(file_id, "a.pdf", "alice", chunks()).await.unwrap();
        assert!(!report.document_created);

        assert!(matches!(
            service.ingest(file_id, "a.pdf", "mallory", chunks()).await,
            Err(RetrievalError::NotOwner { .. })
        ));
        assert_eq!(store.count().await.unwrap(), 2);
    }
}
