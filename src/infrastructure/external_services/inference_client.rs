use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{EmbeddingProvider, EmbeddingProviderError};

#[derive(Debug, Serialize)]
pub struct EmbeddingsRequest {
    pub text: TextInput,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextInput {
    Single(String),
    Multiple(Vec<String>),
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingsResponse {
    pub embeddings: Vec<Vec<f32>>,
    #[serde(default)]
    pub shape: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingsClientConfig {
    pub service_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub model_name: String,
    pub dimension: usize,
}

impl EmbeddingsClientConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
}

impl Default for EmbeddingsClientConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:8080/embeddings".to_string(),
            api_key: None,
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
            model_name: "text-embedding-3-small".to_string(),
            dimension: 1536,
        }
    }
}

/// HTTP client for an embedding service accepting `{"text": ...}` and
/// answering `{"embeddings": [[...], ...]}`.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    client: Client,
    config: EmbeddingsClientConfig,
}

impl InferenceClient {
    pub fn new(config: EmbeddingsClientConfig) -> Result<Self, EmbeddingProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmbeddingProviderError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &EmbeddingsClientConfig {
        &self.config
    }

    async fn send_request(
        &self,
        request: &EmbeddingsRequest,
    ) -> Result<EmbeddingsResponse, EmbeddingProviderError> {
        let mut builder = self
            .client
            .post(&self.config.service_url)
            .header("Content-Type", "application/json")
            .json(request);

        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| EmbeddingProviderError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingProviderError::ApiError(format!(
                "embedding service returned {}: {}",
                status, body
            )));
        }

        response
            .json::<EmbeddingsResponse>()
            .await
            .map_err(|e| EmbeddingProviderError::InvalidResponse(e.to_string()))
    }

    fn check_vectors(
        &self,
        response: EmbeddingsResponse,
        expected_count: usize,
    ) -> Result<Vec<Vec<f32>>, EmbeddingProviderError> {
        if response.embeddings.len() != expected_count {
            return Err(EmbeddingProviderError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                expected_count,
                response.embeddings.len()
            )));
        }

        if let Some(bad) = response
            .embeddings
            .iter()
            .find(|v| v.len() != self.config.dimension)
        {
            return Err(EmbeddingProviderError::InvalidResponse(format!(
                "expected dimension {}, got {}",
                self.config.dimension,
                bad.len()
            )));
        }

        Ok(response.embeddings)
    }
}

#[async_trait]
impl EmbeddingProvider for InferenceClient {
    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>, EmbeddingProviderError> {
        if text.trim().is_empty() {
            return Err(EmbeddingProviderError::InvalidInput(
                "cannot embed empty text".to_string(),
            ));
        }

        let request = EmbeddingsRequest {
            text: TextInput::Single(text.to_string()),
        };
        let response = self.send_request(&request).await?;

        self.check_vectors(response, 1)?
            .pop()
            .ok_or_else(|| EmbeddingProviderError::InvalidResponse("no embedding".to_string()))
    }

    async fn generate_embeddings(
        &self,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, EmbeddingProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingsRequest {
            text: TextInput::Multiple(texts.to_vec()),
        };
        let response = self.send_request(&request).await?;

        self.check_vectors(response, texts.len())
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }

    fn embedding_dimension(&self) -> usize {
        self.config.dimension
    }
}
