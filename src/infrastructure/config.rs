use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::domain::errors::{Result, RetrievalError};
use crate::infrastructure::external_services::EmbeddingsClientConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Path of the SQLite database file.
    pub database_url: String,
    pub max_pool_size: u32,
    pub busy_timeout_ms: u64,
    /// Pins the corpus dimension before the first chunk arrives.
    pub dimension: Option<usize>,
    /// Lets ingestion add chunks to an already ingested document.
    pub append_mode: bool,
    pub embeddings: Option<EmbeddingsClientConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: "ragstore.db".to_string(),
            max_pool_size: 8,
            busy_timeout_ms: 5_000,
            dimension: None,
            append_mode: false,
            embeddings: None,
        }
    }
}

impl EngineConfig {
    pub fn with_database_url(mut self, database_url: impl Into<String>) -> Self {
        self.database_url = database_url.into();
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }

    pub fn with_append_mode(mut self, append_mode: bool) -> Self {
        self.append_mode = append_mode;
        self
    }

    /// Reads `RAGSTORE_*` and `EMBEDDINGS_*` variables, loading `.env` first.
    /// Unset variables keep their defaults. The provider dimension falls back
    /// to `RAGSTORE_DIMENSION` when `EMBEDDINGS_DIMENSION` is unset.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let defaults = Self::default();
        let dimension: Option<usize> = parse_var("RAGSTORE_DIMENSION")?;

        let embeddings = match env::var("EMBEDDINGS_SERVICE_URL") {
            Ok(service_url) => {
                let client_defaults = EmbeddingsClientConfig::default();
                Some(EmbeddingsClientConfig {
                    service_url,
                    api_key: env::var("EMBEDDINGS_API_KEY").ok(),
                    timeout_secs: parse_var("EMBEDDINGS_TIMEOUT_SECS")?
                        .unwrap_or(client_defaults.timeout_secs),
                    model_name: env::var("EMBEDDINGS_MODEL").unwrap_or(client_defaults.model_name),
                    dimension: parse_var("EMBEDDINGS_DIMENSION")?
                        .or(dimension)
                        .unwrap_or(client_defaults.dimension),
                })
            }
            Err(_) => None,
        };

        let config = Self {
            database_url: env::var("RAGSTORE_DATABASE_URL").unwrap_or(defaults.database_url),
            max_pool_size: parse_var("RAGSTORE_POOL_SIZE")?.unwrap_or(defaults.max_pool_size),
            busy_timeout_ms: parse_var("RAGSTORE_BUSY_TIMEOUT_MS")?
                .unwrap_or(defaults.busy_timeout_ms),
            dimension,
            append_mode: parse_var("RAGSTORE_APPEND_MODE")?.unwrap_or(defaults.append_mode),
            embeddings,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            return Err(RetrievalError::invalid_argument("database_url must be set"));
        }
        if self.max_pool_size == 0 {
            return Err(RetrievalError::invalid_argument(
                "max_pool_size must be at least 1",
            ));
        }
        if self.dimension == Some(0) {
            return Err(RetrievalError::invalid_argument(
                "dimension must be at least 1",
            ));
        }
        if let Some(embeddings) = &self.embeddings {
            if embeddings.dimension == 0 {
                return Err(RetrievalError::invalid_argument(
                    "embedding dimension must be at least 1",
                ));
            }
            if let Some(dimension) = self.dimension.filter(|d| *d != embeddings.dimension) {
                return Err(RetrievalError::invalid_argument(format!(
                    "corpus dimension {} differs from embedding dimension {}",
                    dimension, embeddings.dimension
                )));
            }
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| {
            RetrievalError::invalid_argument(format!("{} has an invalid value: {:?}", name, raw))
        }),
        Err(_) => Ok(None),
    }
}
