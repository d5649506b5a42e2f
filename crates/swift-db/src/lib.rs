//! SwiftCodes Database Layer
//!
//! SQLite persistence for SWIFT codes and headquarters/branch links.

pub mod migrations;
pub mod pool;
pub mod queries;

pub use pool::{DbError, DbPool, DbResult, DEFAULT_BUSY_TIMEOUT};

use std::path::Path;
use std::time::Duration;

/// Open the database file and bring its schema up to date.
pub fn init_pool(path: impl AsRef<Path>) -> DbResult<DbPool> {
    init_pool_with_timeout(path, DEFAULT_BUSY_TIMEOUT)
}

/// Like [`init_pool`] with an explicit SQLite busy timeout.
pub fn init_pool_with_timeout(path: impl AsRef<Path>, busy_timeout: Duration) -> DbResult<DbPool> {
    let pool = DbPool::open(path, busy_timeout)?;
    migrations::run_migrations(&pool)?;
    Ok(pool)
}

/// In-memory database with the schema applied.
pub fn init_memory_pool() -> DbResult<DbPool> {
    let pool = DbPool::in_memory()?;
    migrations::run_migrations(&pool)?;
    Ok(pool)
}
