//! Persistence layer for washline
//!
//! Provides:
//! - The `QueueStore` repository contract consumed by the core service
//! - `SqliteStore`: the durable adapter (rusqlite, bundled)
//! - `MemoryStore`: the local fallback adapter
//!
//! The backend is chosen once at process start via [`open_store`]; the
//! core holds an `Arc<dyn QueueStore>` and never branches on which
//! adapter is active.

mod memory;
mod sqlite;
mod traits;

pub use memory::*;
pub use sqlite::*;
pub use traits::*;

use std::sync::Arc;
use thiserror::Error;
use washline_config::{Backend, ServiceConfig};

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Entry not found")]
    NotFound,

    #[error("Queue position already taken")]
    Conflict,
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Conflict
            }
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
            _ => StoreError::Database(e.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Open the store selected by the service configuration.
pub fn open_store(config: &ServiceConfig) -> StoreResult<Arc<dyn QueueStore>> {
    match config.backend {
        Backend::Sqlite => {
            std::fs::create_dir_all(&config.data_dir)?;
            Ok(Arc::new(SqliteStore::open(config.db_path())?))
        }
        Backend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
