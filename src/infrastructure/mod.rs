pub mod config;
pub mod container;
pub mod database;
pub mod external_services;
pub mod memory;

pub use config::EngineConfig;
pub use container::RetrievalEngine;
pub use database::SqliteChunkStore;
pub use external_services::{EmbeddingsClientConfig, InferenceClient};
pub use memory::MemoryChunkStore;
