//! SQLite connection handle.
//!
//! One connection guarded by a mutex. A closure passed to [`DbPool::with_conn`]
//! holds the connection for its whole duration, so a single statement or a
//! single transaction is never interleaved with another caller. Separate calls
//! may interleave freely.

use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

/// Default time SQLite waits on a locked database file before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Database error types.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Connection(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Connection lock poisoned by a panicking caller")]
    PoolPoisoned,
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Store handle passed explicitly to every operation.
#[derive(Debug)]
pub struct DbPool {
    conn: Mutex<Connection>,
}

impl DbPool {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> DbResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.busy_timeout(busy_timeout)?;
        tracing::debug!(path = %path.as_ref().display(), "Opened SQLite database");
        Ok(Self::from_connection(conn))
    }

    /// Private in-memory database, used by tests and dry runs.
    pub fn in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Run `f` with shared access to the connection.
    pub fn with_conn<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<DbError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| E::from(DbError::PoolPoisoned))?;
        f(&conn)
    }

    /// Run `f` with exclusive access, needed to open a transaction.
    pub fn with_conn_mut<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Connection) -> Result<T, E>,
        E: From<DbError>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| E::from(DbError::PoolPoisoned))?;
        f(&mut conn)
    }
}
