use std::sync::Arc;

use tracing::info;

use crate::{
    application::{
        ports::EmbeddingProvider,
        services::{DocumentLifecycleService, IngestionService, SearchService},
        use_cases::{IngestTextUseCase, SearchTextUseCase},
    },
    domain::{errors::Result, repositories::ChunkStore},
    infrastructure::{
        config::EngineConfig, database::SqliteChunkStore, external_services::InferenceClient,
        memory::MemoryChunkStore,
    },
};

/// Everything wired around one chunk store. The text-level use cases are
/// only present when an embedding provider is configured.
pub struct RetrievalEngine {
    // Store
    pub chunk_store: Arc<dyn ChunkStore>,

    // External Services
    pub embedding_provider: Option<Arc<dyn EmbeddingProvider>>,

    // Application Services
    pub ingestion_service: Arc<IngestionService>,
    pub search_service: Arc<SearchService>,
    pub lifecycle_service: Arc<DocumentLifecycleService>,

    // Use Cases
    pub ingest_text_use_case: Option<Arc<IngestTextUseCase>>,
    pub search_text_use_case: Option<Arc<SearchTextUseCase>>,
}

impl RetrievalEngine {
    /// Durable engine backed by the SQLite file named in `config`.
    pub fn open(config: &EngineConfig) -> Result<Self> {
        let chunk_store: Arc<dyn ChunkStore> = Arc::new(SqliteChunkStore::open(config)?);
        Self::assemble(chunk_store, config)
    }

    /// Ephemeral engine; nothing outlives the process.
    pub fn in_memory(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        let store = match config.dimension {
            Some(dimension) => MemoryChunkStore::with_dimension(dimension),
            None => MemoryChunkStore::new(),
        };
        Self::assemble(Arc::new(store), config)
    }

    pub fn with_store(chunk_store: Arc<dyn ChunkStore>, append_mode: bool) -> Self {
        Self {
            ingestion_service: Arc::new(IngestionService::new(chunk_store.clone(), append_mode)),
            search_service: Arc::new(SearchService::new(chunk_store.clone())),
            lifecycle_service: Arc::new(DocumentLifecycleService::new(chunk_store.clone())),
            chunk_store,
            embedding_provider: None,
            ingest_text_use_case: None,
            search_text_use_case: None,
        }
    }

    pub fn with_embedding_provider(mut self, embedding_provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.ingest_text_use_case = Some(Arc::new(IngestTextUseCase::new(
            embedding_provider.clone(),
            self.ingestion_service.clone(),
        )));
        self.search_text_use_case = Some(Arc::new(SearchTextUseCase::new(
            embedding_provider.clone(),
            self.search_service.clone(),
        )));
        self.embedding_provider = Some(embedding_provider);
        self
    }

    fn assemble(chunk_store: Arc<dyn ChunkStore>, config: &EngineConfig) -> Result<Self> {
        let engine = Self::with_store(chunk_store, config.append_mode);

        match &config.embeddings {
            Some(embeddings) => {
                let client = InferenceClient::new(embeddings.clone())?;
                info!(
                    service_url = %embeddings.service_url,
                    model = %embeddings.model_name,
                    "Configured embedding provider"
                );
                Ok(engine.with_embedding_provider(Arc::new(client)))
            }
            None => Ok(engine),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::ChunkInput;
    use crate::infrastructure::external_services::EmbeddingsClientConfig;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_in_memory_engine_round_trip() {
        let engine = RetrievalEngine::in_memory(&EngineConfig::default()).unwrap();
        assert!(engine.search_text_use_case.is_none());

        let file_id = Uuid::new_v4();
        engine
            .ingestion_service
            .ingest(file_id, "a.txt", "alice", vec![ChunkInput::new("hello", vec![1.0, 2.0])])
            .await
            .unwrap();

        let hits = engine
            .search_service
            .search(&[1.0, 2.0], "alice", None, 3)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_pinned_dimension_applies_to_memory_store() {
        let engine = RetrievalEngine::in_memory(&EngineConfig::default().with_dimension(4)).unwrap();
        assert_eq!(engine.chunk_store.dimension().await.unwrap(), Some(4));
    }

    #[test]
    fn test_embeddings_config_wires_use_cases() {
        let config = EngineConfig {
            embeddings: Some(EmbeddingsClientConfig {
                service_url: "http://localhost:8000/embed".to_string(),
                ..EmbeddingsClientConfig::default()
            }),
            ..EngineConfig::default()
        };

        let engine = RetrievalEngine::in_memory(&config).unwrap();
        assert!(engine.ingest_text_use_case.is_some());
        assert!(engine.search_text_use_case.is_some());
    }
}
