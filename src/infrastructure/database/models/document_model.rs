use chrono::DateTime;
use diesel::prelude::*;

use crate::domain::entities::DocumentRecord;
use crate::domain::errors::{Result, RetrievalError};
use crate::domain::value_objects::DocumentMetadata;
use crate::infrastructure::database::models::parse_uuid;
use crate::infrastructure::database::schema::{corpus_settings, documents};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DocumentModel {
    pub file_id: String,
    pub user_id: String,
    pub file_name: String,
    pub metadata: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewDocumentModel {
    pub file_id: String,
    pub user_id: String,
    pub file_name: String,
    pub metadata: Option<String>,
    pub created_at: i64,
}

impl TryFrom<&DocumentRecord> for NewDocumentModel {
    type Error = RetrievalError;

    fn try_from(document: &DocumentRecord) -> Result<Self> {
        Ok(Self {
            file_id: document.file_id().to_string(),
            user_id: document.user_id().to_string(),
            file_name: document.file_name().to_string(),
            metadata: document
                .metadata()
                .map(DocumentMetadata::to_json_string)
                .transpose()?,
            created_at: document.created_at().timestamp_micros(),
        })
    }
}

impl TryFrom<DocumentModel> for DocumentRecord {
    type Error = RetrievalError;

    fn try_from(model: DocumentModel) -> Result<Self> {
        let created_at = DateTime::from_timestamp_micros(model.created_at).ok_or_else(|| {
            RetrievalError::storage(format!("document {} has an invalid created_at", model.file_id))
        })?;
        let metadata = model
            .metadata
            .as_deref()
            .map(DocumentMetadata::from_json_str)
            .transpose()?;

        Ok(DocumentRecord::restore(
            parse_uuid(&model.file_id)?,
            model.user_id,
            model.file_name,
            metadata,
            created_at,
        ))
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = corpus_settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CorpusSettingModel {
    pub setting_key: String,
    pub setting_value: String,
}
