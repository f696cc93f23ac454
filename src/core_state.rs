//! Shared application state handed to the HTTP layer.
//!
//! The engines are synchronous and borrow a `Connection` for the length of
//! one call, so the state owns a single connection behind a `Mutex` and hands
//! out guards. SQLite serialises writers anyway; reads are short.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use crate::config::EngineConfig;
use crate::db::{self, DatabaseError};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock poisoned")]
    LockPoisoned,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

pub struct CoreState {
    conn: Mutex<Connection>,
    pub config: EngineConfig,
}

impl CoreState {
    pub fn new(conn: Connection, config: EngineConfig) -> Self {
        Self {
            conn: Mutex::new(conn),
            config,
        }
    }

    /// Open (creating and migrating if needed) the database at `path`.
    pub fn open(path: &Path, config: EngineConfig) -> Result<Self, CoreError> {
        let conn = db::open_database(path)?;
        tracing::info!(path = %path.display(), "Database opened");
        Ok(Self::new(conn, config))
    }

    /// Fresh in-memory database; used by tests and demos.
    pub fn in_memory(config: EngineConfig) -> Result<Self, CoreError> {
        Ok(Self::new(db::open_memory_database()?, config))
    }

    /// Exclusive access to the connection. Do not hold across `.await`.
    pub fn lock_db(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.conn.lock().map_err(|_| CoreError::LockPoisoned)
    }
}
