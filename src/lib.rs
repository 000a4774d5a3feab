//! Durable semantic chunk retrieval: store text chunks with their embedding
//! vectors and answer exact top-k cosine similarity queries per user.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod telemetry;

pub use application::ports::{EmbeddingProvider, EmbeddingProviderError};
pub use application::services::{
    ChunkInput, DocumentLifecycleService, IngestReport, IngestionService, SearchService, UserStats,
};
pub use application::use_cases::{
    IngestTextRequest, IngestTextUseCase, SearchTextRequest, SearchTextResponse,
    SearchTextUseCase, TextChunk,
};
pub use domain::entities::{ChunkRecord, DocumentRecord, SearchHit};
pub use domain::errors::{Result, RetrievalError};
pub use domain::repositories::{ChunkStore, DeletedDocument};
pub use domain::value_objects::{ContentHash, DocumentMetadata, EmbeddingVector};
pub use infrastructure::{
    EmbeddingsClientConfig, EngineConfig, InferenceClient, MemoryChunkStore, RetrievalEngine,
    SqliteChunkStore,
};
