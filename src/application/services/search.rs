use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::info;
use uuid::Uuid;

use crate::domain::entities::{ChunkRecord, SearchHit};
use crate::domain::errors::{Result, RetrievalError};
use crate::domain::repositories::{ChunkStore, check_dimension};
use crate::domain::value_objects::EmbeddingVector;

/// Candidate sets of at least this size are scored on the rayon pool.
pub const PARALLEL_SCORING_THRESHOLD: usize = 1024;

/// Exact top-k retrieval by cosine similarity.
pub struct SearchService {
    chunk_store: Arc<dyn ChunkStore>,
}

impl SearchService {
    pub fn new(chunk_store: Arc<dyn ChunkStore>) -> Self {
        Self { chunk_store }
    }

    pub async fn search(
        &self,
        query_embedding: &[f32],
        user_id: &str,
        file_id: Option<Uuid>,
        k: usize,
    ) -> Result<Vec<SearchHit>> {
        self.search_with_threshold(query_embedding, user_id, file_id, k, None)
            .await
    }

    /// Like [`search`](Self::search), dropping hits that score below `min_score`.
    pub async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        user_id: &str,
        file_id: Option<Uuid>,
        k: usize,
        min_score: Option<f32>,
    ) -> Result<Vec<SearchHit>> {
        let started = Instant::now();

        if k == 0 {
            return Err(RetrievalError::invalid_argument("k must be at least 1"));
        }
        if min_score.is_some_and(|score| !score.is_finite()) {
            return Err(RetrievalError::invalid_argument("min_score must be finite"));
        }
        let query = EmbeddingVector::new(query_embedding.to_vec())?;

        let Some(dimension) = self.chunk_store.dimension().await? else {
            return Ok(Vec::new());
        };
        check_dimension(Some(dimension), query.dimension())?;

        let candidates = self.chunk_store.get_by_user(user_id, file_id).await?;
        let candidate_count = candidates.len();

        let mut hits = score_candidates(&query, candidates)?;
        if let Some(min_score) = min_score {
            hits.retain(|hit| hit.score >= min_score);
        }
        let hits = top_k(hits, k);

        info!(
            user_id,
            file_id = ?file_id,
            candidates = candidate_count,
            hits = hits.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Search completed"
        );

        Ok(hits)
    }
}

fn score_candidates(query: &EmbeddingVector, candidates: Vec<ChunkRecord>) -> Result<Vec<SearchHit>> {
    let score = |chunk: ChunkRecord| -> Result<SearchHit> {
        let score = chunk.embedding().cosine_similarity(query.as_slice())?;
        Ok(SearchHit::new(chunk, score))
    };

    if candidates.len() >= PARALLEL_SCORING_THRESHOLD {
        candidates.into_par_iter().map(score).collect()
    } else {
        candidates.into_iter().map(score).collect()
    }
}

/// Keeps the `k` best hits in rank order. `k` must be non-zero.
fn top_k(mut hits: Vec<SearchHit>, k: usize) -> Vec<SearchHit> {
    if hits.len() > k {
        hits.select_nth_unstable_by(k - 1, SearchHit::rank_cmp);
        hits.truncate(k);
    }
    hits.sort_by(SearchHit::rank_cmp);
    hits
}
