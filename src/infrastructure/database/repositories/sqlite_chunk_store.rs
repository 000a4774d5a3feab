use async_trait::async_trait;
use diesel::prelude::*;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::entities::{ChunkRecord, DocumentRecord, current_timestamp};
use crate::domain::errors::{Result, RetrievalError};
use crate::domain::repositories::{
    BatchMode, ChunkStore, CommittedBatch, DeletedDocument, IngestBatch, check_chunk_owner,
    check_dimension,
};
use crate::infrastructure::config::EngineConfig;
use crate::infrastructure::database::models::{
    ChunkModel, CorpusSettingModel, DocumentModel, NewChunkModel, NewDocumentModel,
    RetiredChunkModel,
};
use crate::infrastructure::database::schema::{
    chunks, corpus_settings, documents, retired_chunk_ids,
};
use crate::infrastructure::database::{
    DbConnection, DbPool, create_connection_pool, get_connection_from_pool, run_migrations,
};

const DIMENSION_KEY: &str = "dimension";

/// Durable `ChunkStore` on SQLite. Every mutation runs in one
/// `BEGIN IMMEDIATE` transaction; every read is a single statement.
pub struct SqliteChunkStore {
    pool: DbPool,
}

impl SqliteChunkStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Opens (or creates) the database, applies pending migrations and pins
    /// the configured dimension.
    pub fn open(config: &EngineConfig) -> Result<Self> {
        config.validate()?;

        let pool = create_connection_pool(config)?;
        let mut conn = get_connection_from_pool(&pool)?;
        let applied = run_migrations(&mut conn)?;

        if let Some(dimension) = config.dimension {
            conn.immediate_transaction::<_, RetrievalError, _>(|conn| {
                match load_dimension(conn)? {
                    Some(established) => check_dimension(Some(established), dimension),
                    None => establish_dimension(conn, dimension),
                }
            })?;
        }

        info!(
            database_url = %config.database_url,
            migrations_applied = applied,
            "Opened SQLite chunk store"
        );

        Ok(Self::new(pool))
    }

    fn connection(&self) -> Result<DbConnection> {
        Ok(get_connection_from_pool(&self.pool)?)
    }
}

#[async_trait]
impl ChunkStore for SqliteChunkStore {
    async fn dimension(&self) -> Result<Option<usize>> {
        let mut conn = self.connection()?;
        load_dimension(&mut conn)
    }

    async fn put(&self, chunk: &ChunkRecord) -> Result<()> {
        let mut conn = self.connection()?;

        conn.immediate_transaction::<_, RetrievalError, _>(|conn| {
            let document = load_document(conn, chunk.file_id())?
                .ok_or(RetrievalError::NotFound(chunk.file_id()))?;
            check_chunk_owner(&document, chunk)?;
            let established = load_dimension(conn)?;
            ensure_dimension(conn, established, chunk.dimension())?;
            ensure_chunk_id_unused(conn, chunk.chunk_id())?;

            let index_taken: i64 = chunks::table
                .filter(chunks::file_id.eq(chunk.file_id().to_string()))
                .filter(chunks::chunk_index.eq(i64::from(chunk.chunk_index())))
                .count()
                .get_result(conn)?;
            if index_taken > 0 {
                return Err(RetrievalError::invalid_argument(format!(
                    "document {} already has a chunk at index {}",
                    chunk.file_id(),
                    chunk.chunk_index()
                )));
            }

            insert_chunk(conn, chunk)
        })
    }

    async fn write_batch(&self, batch: IngestBatch) -> Result<CommittedBatch> {
        if batch.chunks.is_empty() {
            return Err(RetrievalError::invalid_argument(
                "a batch must contain at least one chunk",
            ));
        }

        let mut conn = self.connection()?;
        let committed =
            conn.immediate_transaction::<_, RetrievalError, _>(|conn| write_batch_in(conn, batch))?;

        debug!(
            file_id = %committed.document.file_id(),
            chunks = committed.chunks.len(),
            document_created = committed.document_created,
            "Committed chunk batch"
        );

        Ok(committed)
    }

    async fn find_document(&self, file_id: Uuid) -> Result<Option<DocumentRecord>> {
        let mut conn = self.connection()?;
        load_document(&mut conn, file_id)
    }

    async fn get_by_document(&self, file_id: Uuid) -> Result<Vec<ChunkRecord>> {
        let mut conn = self.connection()?;

        let models = chunks::table
            .filter(chunks::file_id.eq(file_id.to_string()))
            .order(chunks::chunk_index.asc())
            .select(ChunkModel::as_select())
            .load(&mut conn)?;

        into_records(models)
    }

    async fn get_by_user(
        &self,
        user_id: &str,
        file_id: Option<Uuid>,
    ) -> Result<Vec<ChunkRecord>> {
        let mut conn = self.connection()?;

        let mut query = chunks::table
            .filter(chunks::user_id.eq(user_id))
            .into_boxed();
        if let Some(file_id) = file_id {
            query = query.filter(chunks::file_id.eq(file_id.to_string()));
        }

        let models = query
            .order((
                chunks::created_at.asc(),
                chunks::file_id.asc(),
                chunks::chunk_index.asc(),
            ))
            .select(ChunkModel::as_select())
            .load(&mut conn)?;

        into_records(models)
    }

    async fn list_documents(&self, user_id: &str) -> Result<Vec<DocumentRecord>> {
        let mut conn = self.connection()?;

        let models = documents::table
            .filter(documents::user_id.eq(user_id))
            .order((documents::created_at.desc(), documents::file_id.asc()))
            .select(DocumentModel::as_select())
            .load(&mut conn)?;

        models.into_iter().map(DocumentRecord::try_from).collect()
    }

    async fn delete_document(
        &self,
        file_id: Uuid,
        requesting_user_id: &str,
    ) -> Result<DeletedDocument> {
        let mut conn = self.connection()?;

        conn.immediate_transaction::<_, RetrievalError, _>(|conn| {
            let document =
                load_document(conn, file_id)?.ok_or(RetrievalError::NotFound(file_id))?;
            if !document.is_owned_by(requesting_user_id) {
                return Err(RetrievalError::NotOwner {
                    file_id,
                    user_id: requesting_user_id.to_string(),
                });
            }

            let key = file_id.to_string();
            let chunk_ids: Vec<String> = chunks::table
                .filter(chunks::file_id.eq(&key))
                .select(chunks::chunk_id)
                .load(conn)?;

            let retired_at = current_timestamp().timestamp_micros();
            let tombstones: Vec<RetiredChunkModel> = chunk_ids
                .into_iter()
                .map(|chunk_id| RetiredChunkModel {
                    chunk_id,
                    retired_at,
                })
                .collect();
            if !tombstones.is_empty() {
                diesel::insert_into(retired_chunk_ids::table)
                    .values(&tombstones)
                    .execute(conn)?;
            }

            let chunks_removed =
                diesel::delete(chunks::table.filter(chunks::file_id.eq(&key))).execute(conn)?;
            diesel::delete(documents::table.find(&key)).execute(conn)?;

            Ok(DeletedDocument {
                document,
                chunks_removed,
            })
        })
    }

    async fn count(&self) -> Result<usize> {
        let mut conn = self.connection()?;
        let total: i64 = chunks::table.count().get_result(&mut conn)?;
        Ok(total as usize)
    }

    async fn count_by_user(&self, user_id: &str) -> Result<usize> {
        let mut conn = self.connection()?;
        let total: i64 = chunks::table
            .filter(chunks::user_id.eq(user_id))
            .count()
            .get_result(&mut conn)?;
        Ok(total as usize)
    }
}

fn write_batch_in(conn: &mut SqliteConnection, batch: IngestBatch) -> Result<CommittedBatch> {
    let IngestBatch {
        document,
        mode,
        mut chunks,
    } = batch;
    let file_id = document.file_id();

    let (document, document_created, first_index) = match load_document(conn, file_id)? {
        None => {
            diesel::insert_into(documents::table)
                .values(NewDocumentModel::try_from(&document)?)
                .execute(conn)?;
            (document, true, 0)
        }
        Some(_) if mode == BatchMode::CreateOnly => {
            return Err(RetrievalError::AlreadyIngested(file_id));
        }
        Some(existing) => {
            if !existing.is_owned_by(document.user_id()) {
                return Err(RetrievalError::NotOwner {
                    file_id,
                    user_id: document.user_id().to_string(),
                });
            }
            let first_index = next_chunk_index(conn, file_id)?;
            (existing, false, first_index)
        }
    };

    let mut established = load_dimension(conn)?;
    for (offset, chunk) in chunks.iter_mut().enumerate() {
        chunk.set_chunk_index(offset_index(first_index, offset)?);
        check_chunk_owner(&document, chunk)?;
        established = Some(ensure_dimension(conn, established, chunk.dimension())?);
        ensure_chunk_id_unused(conn, chunk.chunk_id())?;
        insert_chunk(conn, chunk)?;
    }

    Ok(CommittedBatch {
        document,
        document_created,
        chunks,
    })
}

fn offset_index(first_index: u32, offset: usize) -> Result<u32> {
    u32::try_from(offset)
        .ok()
        .and_then(|offset| first_index.checked_add(offset))
        .ok_or_else(|| RetrievalError::invalid_argument("document has too many chunks"))
}

fn next_chunk_index(conn: &mut SqliteConnection, file_id: Uuid) -> Result<u32> {
    let last: Option<i64> = chunks::table
        .filter(chunks::file_id.eq(file_id.to_string()))
        .select(diesel::dsl::max(chunks::chunk_index))
        .first(conn)?;

    match last {
        None => Ok(0),
        Some(last) => u32::try_from(last + 1)
            .map_err(|_| RetrievalError::storage(format!("document {} has an invalid chunk index", file_id))),
    }
}

fn load_document(conn: &mut SqliteConnection, file_id: Uuid) -> Result<Option<DocumentRecord>> {
    documents::table
        .find(file_id.to_string())
        .select(DocumentModel::as_select())
        .first(conn)
        .optional()?
        .map(DocumentRecord::try_from)
        .transpose()
}

fn load_dimension(conn: &mut SqliteConnection) -> Result<Option<usize>> {
    let stored: Option<String> = corpus_settings::table
        .find(DIMENSION_KEY)
        .select(corpus_settings::setting_value)
        .first(conn)
        .optional()?;

    stored
        .map(|raw| {
            raw.parse::<usize>()
                .map_err(|_| RetrievalError::storage(format!("stored dimension {:?} is invalid", raw)))
        })
        .transpose()
}

fn establish_dimension(conn: &mut SqliteConnection, dimension: usize) -> Result<()> {
    diesel::insert_into(corpus_settings::table)
        .values(CorpusSettingModel {
            setting_key: DIMENSION_KEY.to_string(),
            setting_value: dimension.to_string(),
        })
        .execute(conn)?;

    info!(dimension, "Established corpus dimension");
    Ok(())
}

/// Returns the corpus dimension after accepting a vector of `actual` length.
fn ensure_dimension(
    conn: &mut SqliteConnection,
    established: Option<usize>,
    actual: usize,
) -> Result<usize> {
    match established {
        Some(expected) => {
            check_dimension(Some(expected), actual)?;
            Ok(expected)
        }
        None => {
            establish_dimension(conn, actual)?;
            Ok(actual)
        }
    }
}

fn ensure_chunk_id_unused(conn: &mut SqliteConnection, chunk_id: Uuid) -> Result<()> {
    let key = chunk_id.to_string();

    let live: i64 = chunks::table
        .filter(chunks::chunk_id.eq(&key))
        .count()
        .get_result(conn)?;
    let retired: i64 = retired_chunk_ids::table
        .filter(retired_chunk_ids::chunk_id.eq(&key))
        .count()
        .get_result(conn)?;

    if live + retired > 0 {
        return Err(RetrievalError::DuplicateId(chunk_id));
    }
    Ok(())
}

fn insert_chunk(conn: &mut SqliteConnection, chunk: &ChunkRecord) -> Result<()> {
    diesel::insert_into(chunks::table)
        .values(NewChunkModel::from(chunk))
        .execute(conn)?;
    Ok(())
}

fn into_records(models: Vec<ChunkModel>) -> Result<Vec<ChunkRecord>> {
    models.into_iter().map(ChunkRecord::try_from).collect()
}
