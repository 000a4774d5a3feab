pub mod memory_chunk_store;

pub use memory_chunk_store::MemoryChunkStore;
