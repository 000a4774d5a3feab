use chrono::DateTime;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::ChunkRecord;
use crate::domain::errors::{Result, RetrievalError};
use crate::domain::value_objects::{ContentHash, EmbeddingVector};
use crate::infrastructure::database::schema::{chunks, retired_chunk_ids};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = chunks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ChunkModel {
    pub chunk_id: String,
    pub file_id: String,
    pub user_id: String,
    pub chunk_index: i64,
    pub chunk_text: String,
    pub content_hash: String,
    pub embedding: Vec<u8>,
    pub dimension: i64,
    pub page_number: Option<i64>,
    pub created_at: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = chunks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewChunkModel {
    pub chunk_id: String,
    pub file_id: String,
    pub user_id: String,
    pub chunk_index: i64,
    pub chunk_text: String,
    pub content_hash: String,
    pub embedding: Vec<u8>,
    pub dimension: i64,
    pub page_number: Option<i64>,
    pub created_at: i64,
}

impl From<&ChunkRecord> for NewChunkModel {
    fn from(chunk: &ChunkRecord) -> Self {
        Self {
            chunk_id: chunk.chunk_id().to_string(),
            file_id: chunk.file_id().to_string(),
            user_id: chunk.user_id().to_string(),
            chunk_index: i64::from(chunk.chunk_index()),
            chunk_text: chunk.text().to_string(),
            content_hash: chunk.content_hash().to_string(),
            embedding: chunk.embedding().to_le_bytes(),
            dimension: chunk.dimension() as i64,
            page_number: chunk.page_number().map(i64::from),
            created_at: chunk.created_at().timestamp_micros(),
        }
    }
}

impl TryFrom<ChunkModel> for ChunkRecord {
    type Error = RetrievalError;

    fn try_from(model: ChunkModel) -> Result<Self> {
        let dimension = usize::try_from(model.dimension)
            .map_err(|_| corrupt(&model.chunk_id, "dimension"))?;
        let embedding = EmbeddingVector::from_le_bytes(&model.embedding, dimension)?;
        let chunk_index = u32::try_from(model.chunk_index)
            .map_err(|_| corrupt(&model.chunk_id, "chunk_index"))?;
        let page_number = model
            .page_number
            .map(u32::try_from)
            .transpose()
            .map_err(|_| corrupt(&model.chunk_id, "page_number"))?;
        let created_at = DateTime::from_timestamp_micros(model.created_at)
            .ok_or_else(|| corrupt(&model.chunk_id, "created_at"))?;
        let stored_hash = ContentHash::new(model.content_hash)?;

        let chunk = ChunkRecord::with_id(
            parse_uuid(&model.chunk_id)?,
            parse_uuid(&model.file_id)?,
            model.user_id,
            chunk_index,
            model.chunk_text,
            embedding,
            page_number,
            created_at,
        )?;

        if chunk.content_hash() != &stored_hash {
            return Err(corrupt(&model.chunk_id, "content_hash"));
        }

        Ok(chunk)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = retired_chunk_ids)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RetiredChunkModel {
    pub chunk_id: String,
    pub retired_at: i64,
}

pub fn parse_uuid(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| RetrievalError::storage(format!("invalid id {:?}: {}", raw, e)))
}

fn corrupt(chunk_id: &str, column: &str) -> RetrievalError {
    RetrievalError::storage(format!("chunk {} has an invalid {}", chunk_id, column))
}
