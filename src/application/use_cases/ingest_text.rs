use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::application::ports::EmbeddingProvider;
use crate::application::services::{ChunkInput, IngestReport, IngestionService};
use crate::domain::errors::{Result, RetrievalError};
use crate::domain::value_objects::DocumentMetadata;

#[derive(Debug, Clone)]
pub struct TextChunk {
    pub text: String,
    pub page_number: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct IngestTextRequest {
    pub file_id: Uuid,
    pub file_name: String,
    pub user_id: String,
    pub metadata: Option<DocumentMetadata>,
    pub chunks: Vec<TextChunk>,
}

/// Embeds chunk texts with the provider, then ingests them.
pub struct IngestTextUseCase {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    ingestion_service: Arc<IngestionService>,
}

impl IngestTextUseCase {
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        ingestion_service: Arc<IngestionService>,
    ) -> Self {
        Self {
            embedding_provider,
            ingestion_service,
        }
    }

    pub async fn execute(&self, request: IngestTextRequest) -> Result<IngestReport> {
        if request.chunks.is_empty() {
            return Err(RetrievalError::invalid_argument(
                "at least one chunk is required",
            ));
        }

        let texts: Vec<String> = request.chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedding_provider.generate_embeddings(&texts).await?;

        if embeddings.len() != texts.len() {
            return Err(RetrievalError::Embedding(format!(
                "provider returned {} embeddings for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }

        debug!(
            file_id = %request.file_id,
            model = self.embedding_provider.model_name(),
            chunks = texts.len(),
            "Embedded chunk texts"
        );

        let inputs = request
            .chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| ChunkInput {
                text: chunk.text,
                embedding,
                page_number: chunk.page_number,
            })
            .collect();

        self.ingestion_service
            .ingest_with_metadata(
                request.file_id,
                &request.file_name,
                &request.user_id,
                request.metadata,
                inputs,
            )
            .await
    }
}
