use serde::{Deserialize, Serialize};

use crate::domain::errors::{Result, RetrievalError};
use crate::domain::services::vector_math;

const F32_BYTES: usize = std::mem::size_of::<f32>();

/// A validated embedding: non-empty, every component finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    pub fn new(values: Vec<f32>) -> Result<Self> {
        if values.is_empty() {
            return Err(RetrievalError::invalid_argument(
                "embedding must have at least one component",
            ));
        }

        if let Some(position) = values.iter().position(|v| !v.is_finite()) {
            return Err(RetrievalError::invalid_argument(format!(
                "embedding component {} is not finite",
                position
            )));
        }

        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn magnitude(&self) -> f64 {
        vector_math::magnitude(&self.0)
    }

    pub fn dot(&self, other: &[f32]) -> Result<f64> {
        vector_math::dot(&self.0, other)
    }

    pub fn cosine_similarity(&self, other: &[f32]) -> Result<f32> {
        vector_math::cosine_similarity(&self.0, other)
    }

    /// Little-endian `f32` encoding used for BLOB storage.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.0.len() * F32_BYTES);
        for value in &self.0 {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    pub fn from_le_bytes(bytes: &[u8], dimension: usize) -> Result<Self> {
        let expected_len = dimension
            .checked_mul(F32_BYTES)
            .ok_or_else(|| RetrievalError::storage("embedding dimension overflows"))?;

        if bytes.len() != expected_len {
            return Err(RetrievalError::storage(format!(
                "embedding blob is {} bytes, expected {}",
                bytes.len(),
                expected_len
            )));
        }

        let values = bytes
            .chunks_exact(F32_BYTES)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        Self::new(values).map_err(|e| RetrievalError::storage(format!("corrupt embedding: {}", e)))
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl TryFrom<Vec<f32>> for EmbeddingVector {
    type Error = RetrievalError;

    fn try_from(values: Vec<f32>) -> Result<Self> {
        Self::new(values)
    }
}

impl From<EmbeddingVector> for Vec<f32> {
    fn from(vector: EmbeddingVector) -> Self {
        vector.0
    }
}
