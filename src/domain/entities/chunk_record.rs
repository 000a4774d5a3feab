use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{Result, RetrievalError};
use crate::domain::value_objects::{ContentHash, EmbeddingVector};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ChunkRecordFields")]
pub struct ChunkRecord {
    chunk_id: Uuid,
    file_id: Uuid,
    user_id: String,
    chunk_index: u32,
    text: String,
    content_hash: ContentHash,
    embedding: EmbeddingVector,
    page_number: Option<u32>,
    created_at: DateTime<Utc>,
}

/// Wire shape of a chunk; converted through `ChunkRecord::with_id` so the
/// same checks apply to deserialized records.
#[derive(Deserialize)]
struct ChunkRecordFields {
    chunk_id: Uuid,
    file_id: Uuid,
    user_id: String,
    chunk_index: u32,
    text: String,
    content_hash: ContentHash,
    embedding: EmbeddingVector,
    page_number: Option<u32>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ChunkRecordFields> for ChunkRecord {
    type Error = RetrievalError;

    fn try_from(fields: ChunkRecordFields) -> Result<Self> {
        let chunk = Self::with_id(
            fields.chunk_id,
            fields.file_id,
            fields.user_id,
            fields.chunk_index,
            fields.text,
            fields.embedding,
            fields.page_number,
            fields.created_at,
        )?;

        if chunk.content_hash != fields.content_hash {
            return Err(RetrievalError::invalid_argument(format!(
                "content hash of chunk {} does not match its text",
                chunk.chunk_id
            )));
        }
        Ok(chunk)
    }
}

impl ChunkRecord {
    /// Builds a new chunk with a fresh UUIDv7 id. Ids generated later in the
    /// process sort after earlier ones, so chunks of one batch rank in
    /// insertion order when everything else ties.
    pub fn new(
        file_id: Uuid,
        user_id: String,
        chunk_index: u32,
        text: String,
        embedding: EmbeddingVector,
        page_number: Option<u32>,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        Self::with_id(
            Uuid::now_v7(),
            file_id,
            user_id,
            chunk_index,
            text,
            embedding,
            page_number,
            created_at,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_id(
        chunk_id: Uuid,
        file_id: Uuid,
        user_id: String,
        chunk_index: u32,
        text: String,
        embedding: EmbeddingVector,
        page_number: Option<u32>,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(RetrievalError::invalid_argument("chunk text must not be empty"));
        }

        Ok(Self {
            chunk_id,
            file_id,
            user_id,
            chunk_index,
            content_hash: ContentHash::of_text(&text),
            text,
            embedding,
            page_number,
            created_at,
        })
    }

    pub fn chunk_id(&self) -> Uuid {
        self.chunk_id
    }

    pub fn file_id(&self) -> Uuid {
        self.file_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn chunk_index(&self) -> u32 {
        self.chunk_index
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn content_hash(&self) -> &ContentHash {
        &self.content_hash
    }

    pub fn embedding(&self) -> &EmbeddingVector {
        &self.embedding
    }

    pub fn dimension(&self) -> usize {
        self.embedding.dimension()
    }

    pub fn page_number(&self) -> Option<u32> {
        self.page_number
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn character_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    // Stores assign the final position when a batch is appended.
    pub(crate) fn set_chunk_index(&mut self, chunk_index: u32) {
        self.chunk_index = chunk_index;
    }
}
