pub mod document_lifecycle;
pub mod ingestion;
pub mod search;

pub use document_lifecycle::{DocumentLifecycleService, UserStats};
pub use ingestion::{ChunkInput, IngestReport, IngestionService};
pub use search::{PARALLEL_SCORING_THRESHOLD, SearchService};
