use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domain::entities::ChunkRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub chunk: ChunkRecord,
    pub score: f32,
}

impl SearchHit {
    pub fn new(chunk: ChunkRecord, score: f32) -> Self {
        Self { chunk, score }
    }

    /// Result ordering: score descending, then `created_at` ascending, then
    /// `chunk_id` ascending. Total, so ranking never depends on input order.
    pub fn rank_cmp(&self, other: &SearchHit) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.chunk.created_at().cmp(&other.chunk.created_at()))
            .then_with(|| self.chunk.chunk_id().cmp(&other.chunk.chunk_id()))
    }
}
