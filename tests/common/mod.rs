#![allow(dead_code)]

use std::ops::Deref;
use std::path::PathBuf;

use ragstore::{ChunkInput, EngineConfig, RetrievalEngine};
use tempfile::TempDir;
use uuid::Uuid;

pub const OWNER: &str = "alice";
pub const OTHER_USER: &str = "bob";

/// An engine plus whatever must outlive it.
pub struct TestEngine {
    pub backend: &'static str,
    pub engine: RetrievalEngine,
    dir: Option<TempDir>,
}

impl TestEngine {
    pub fn database_path(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.path().join("corpus.db"))
    }
}

impl Deref for TestEngine {
    type Target = RetrievalEngine;

    fn deref(&self) -> &RetrievalEngine {
        &self.engine
    }
}

pub fn sqlite_config(dir: &TempDir) -> EngineConfig {
    EngineConfig::default().with_database_url(dir.path().join("corpus.db").to_string_lossy())
}

pub fn memory_engine(append_mode: bool) -> TestEngine {
    let config = EngineConfig::default().with_append_mode(append_mode);
    TestEngine {
        backend: "memory",
        engine: RetrievalEngine::in_memory(&config).unwrap(),
        dir: None,
    }
}

pub fn sqlite_engine(append_mode: bool) -> TestEngine {
    let dir = tempfile::tempdir().unwrap();
    let config = sqlite_config(&dir).with_append_mode(append_mode);
    TestEngine {
        backend: "sqlite",
        engine: RetrievalEngine::open(&config).unwrap(),
        dir: Some(dir),
    }
}

/// One engine per backend, so every property is checked against both.
pub fn engines(append_mode: bool) -> Vec<TestEngine> {
    vec![memory_engine(append_mode), sqlite_engine(append_mode)]
}

/// Unit vector in the plane whose cosine with `[1, 0]` is `similarity`.
pub fn at_similarity(similarity: f32) -> Vec<f32> {
    vec![similarity, (1.0 - similarity * similarity).sqrt()]
}

pub fn inputs(texts_and_vectors: &[(&str, Vec<f32>)]) -> Vec<ChunkInput> {
    texts_and_vectors
        .iter()
        .map(|(text, vector)| ChunkInput::new(*text, vector.clone()))
        .collect()
}

pub async fn ingest(
    engine: &RetrievalEngine,
    user_id: &str,
    texts_and_vectors: &[(&str, Vec<f32>)],
) -> Uuid {
    let file_id = Uuid::new_v4();
    engine
        .ingestion_service
        .ingest(file_id, "document.pdf", user_id, inputs(texts_and_vectors))
        .await
        .unwrap();
    file_id
}
