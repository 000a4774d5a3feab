pub mod ingest_text;
pub mod search_text;

pub use ingest_text::{IngestTextRequest, IngestTextUseCase, TextChunk};
pub use search_text::{SearchTextRequest, SearchTextResponse, SearchTextUseCase};
