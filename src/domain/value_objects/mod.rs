pub mod content_hash;
pub mod document_metadata;
pub mod embedding_vector;

pub use content_hash::ContentHash;
pub use document_metadata::DocumentMetadata;
pub use embedding_vector::EmbeddingVector;
