use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, RetrievalError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetrievalError {
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("duplicate chunk id: {0}")]
    DuplicateId(Uuid),
    #[error("document already ingested: {0}")]
    AlreadyIngested(Uuid),
    #[error("user {user_id} does not own document {file_id}")]
    NotOwner { file_id: Uuid, user_id: String },
    #[error("document not found: {0}")]
    NotFound(Uuid),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("embedding error: {0}")]
    Embedding(String),
}

impl RetrievalError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        RetrievalError::InvalidArgument(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        RetrievalError::Storage(msg.into())
    }
}
