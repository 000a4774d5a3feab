pub mod chunk_record;
pub mod document_record;
pub mod search_hit;

pub use chunk_record::ChunkRecord;
pub use document_record::DocumentRecord;
pub use search_hit::SearchHit;

use chrono::{DateTime, Utc};

/// Current time truncated to the microsecond precision the stores persist.
pub fn current_timestamp() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now)
}
