use async_trait::async_trait;
use thiserror::Error;

use crate::domain::errors::RetrievalError;

#[derive(Debug, Error)]
pub enum EmbeddingProviderError {
    #[error("network error: {0}")]
    NetworkError(String),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<EmbeddingProviderError> for RetrievalError {
    fn from(error: EmbeddingProviderError) -> Self {
        RetrievalError::Embedding(error.to_string())
    }
}

/// Maps text to fixed-length vectors. Failures are reported, never retried.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>, EmbeddingProviderError>;

    /// One vector per input text, in input order.
    async fn generate_embeddings(
        &self,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, EmbeddingProviderError>;

    fn model_name(&self) -> &str;

    fn embedding_dimension(&self) -> usize;
}
