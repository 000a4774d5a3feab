pub mod chunk_store;

pub use chunk_store::{
    BatchMode, ChunkStore, CommittedBatch, DeletedDocument, IngestBatch, check_chunk_owner,
    check_dimension,
};
