pub mod chunk_model;
pub mod document_model;

pub use chunk_model::{ChunkModel, NewChunkModel, RetiredChunkModel, parse_uuid};
pub use document_model::{CorpusSettingModel, DocumentModel, NewDocumentModel};
