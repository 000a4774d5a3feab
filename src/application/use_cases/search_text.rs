use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::application::ports::EmbeddingProvider;
use crate::application::services::SearchService;
use crate::domain::entities::SearchHit;
use crate::domain::errors::{Result, RetrievalError};

#[derive(Debug, Clone)]
pub struct SearchTextRequest {
    pub query: String,
    pub user_id: String,
    pub file_id: Option<Uuid>,
    pub limit: usize,
    pub min_score: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct SearchTextResponse {
    pub query: String,
    pub hits: Vec<SearchHit>,
    pub search_time_ms: u64,
}

pub struct SearchTextUseCase {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    search_service: Arc<SearchService>,
}

impl SearchTextUseCase {
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        search_service: Arc<SearchService>,
    ) -> Self {
        Self {
            embedding_provider,
            search_service,
        }
    }

    pub async fn execute(&self, request: SearchTextRequest) -> Result<SearchTextResponse> {
        let start_time = Instant::now();

        if request.query.trim().is_empty() {
            return Err(RetrievalError::invalid_argument("query must not be empty"));
        }

        let query_embedding = self
            .embedding_provider
            .generate_embedding(&request.query)
            .await?;

        let hits = self
            .search_service
            .search_with_threshold(
                &query_embedding,
                &request.user_id,
                request.file_id,
                request.limit,
                request.min_score,
            )
            .await?;

        Ok(SearchTextResponse {
            query: request.query,
            hits,
            search_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::EmbeddingProviderError;
    use crate::application::services::{ChunkInput, IngestionService};
    use crate::domain::repositories::ChunkStore;
    use crate::infrastructure::memory::MemoryChunkStore;
    use async_trait::async_trait;

    /// Maps a handful of words onto axis-aligned vectors.
    struct KeywordProvider;

    #[async_trait]
    impl EmbeddingProvider for KeywordProvider {
        async fn generate_embedding(&self, text: &str) -> std::result::Result<Vec<f32>, EmbeddingProviderError> {
            match text {
                "gravity" => Ok(vec![1.0, 0.0]),
                "optics" => Ok(vec![0.0, 1.0]),
                _ => Err(EmbeddingProviderError::ApiError("unknown word".to_string())),
            }
        }

        async fn generate_embeddings(
            &self,
            texts: &[String],
        ) -> std::result::Result<Vec<Vec<f32>>, EmbeddingProviderError> {
            let mut embeddings = Vec::with_capacity(texts.len());
            for text in texts {
                embeddings.push(self.generate_embedding(text).await?);
            }
            Ok(embeddings)
        }

        fn model_name(&self) -> &str {
            "keywords"
        }

        fn embedding_dimension(&self) -> usize {
            2
        }
    }

    async fn use_case() -> SearchTextUseCase {
        let store: Arc<dyn ChunkStore> = Arc::new(MemoryChunkStore::new());
        IngestionService::new(store.clone(), false)
            .ingest(
                Uuid::new_v4(),
                "physics.pdf",
                "alice",
                vec![
                    ChunkInput::new("Apples fall down.", vec![0.9, 0.1]),
                    ChunkInput::new("Light bends in water.", vec![0.1, 0.9]),
                ],
            )
            .await
            .unwrap();

        SearchTextUseCase::new(Arc::new(KeywordProvider), Arc::new(SearchService::new(store)))
    }

    fn request(query: &str) -> SearchTextRequest {
        SearchTextRequest {
            query: query.to_string(),
            user_id: "alice".to_string(),
            file_id: None,
            limit: 1,
            min_score: None,
        }
    }

    #[tokio::test]
    async fn test_query_text_is_embedded_and_searched() {
        let response = use_case().await.execute(request("optics")).await.unwrap();

        assert_eq!(response.hits.len(), 1);
        assert_eq!(response.hits[0].chunk.text(), "Light bends in water.");
    }

    #[tokio::test]
    async fn test_blank_query_and_provider_failure() {
        let use_case = use_case().await;

        assert!(matches!(
            use_case.execute(request("   ")).await,
            Err(RetrievalError::InvalidArgument(_))
        ));
        assert!(matches!(
            use_case.execute(request("chemistry")).await,
            Err(RetrievalError::Embedding(_))
        ));
    }
}
