use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::current_timestamp;
use crate::domain::value_objects::DocumentMetadata;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    file_id: Uuid,
    user_id: String,
    file_name: String,
    metadata: Option<DocumentMetadata>,
    created_at: DateTime<Utc>,
}

impl DocumentRecord {
    pub fn new(
        file_id: Uuid,
        user_id: String,
        file_name: String,
        metadata: Option<DocumentMetadata>,
    ) -> Self {
        Self::restore(file_id, user_id, file_name, metadata, current_timestamp())
    }

    /// Rebuilds a record read back from a store.
    pub fn restore(
        file_id: Uuid,
        user_id: String,
        file_name: String,
        metadata: Option<DocumentMetadata>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            file_id,
            user_id,
            file_name,
            metadata,
            created_at,
        }
    }

    pub fn file_id(&self) -> Uuid {
        self.file_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn metadata(&self) -> Option<&DocumentMetadata> {
        self.metadata.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_creation() {
        let file_id = Uuid::new_v4();
        let document =
            DocumentRecord::new(file_id, "user1".to_string(), "physics.pdf".to_string(), None);

        assert_eq!(document.file_id(), file_id);
        assert_eq!(document.file_name(), "physics.pdf");
        assert!(document.is_owned_by("user1"));
        assert!(!document.is_owned_by("user2"));
        assert_eq!(document.created_at().timestamp_subsec_nanos() % 1_000, 0);
    }
}
