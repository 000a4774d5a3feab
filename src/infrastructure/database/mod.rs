pub mod connection;
pub mod models;
pub mod repositories;
pub mod schema;

pub use connection::{
    DatabaseError, DbConnection, DbPool, create_connection_pool, get_connection_from_pool,
    run_migrations,
};
pub use repositories::SqliteChunkStore;

use crate::domain::errors::RetrievalError;

impl From<DatabaseError> for RetrievalError {
    fn from(error: DatabaseError) -> Self {
        RetrievalError::Storage(error.to_string())
    }
}

impl From<diesel::result::Error> for RetrievalError {
    fn from(error: diesel::result::Error) -> Self {
        RetrievalError::Storage(error.to_string())
    }
}
