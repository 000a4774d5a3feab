pub mod sqlite_chunk_store;

pub use sqlite_chunk_store::SqliteChunkStore;
