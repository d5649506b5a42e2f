//! Centralized error types for SwiftCodes.

use swift_db::DbError;
use thiserror::Error;

/// Main error type for hierarchy operations.
///
/// A duplicate-code write is not an error; it is reported as
/// [`WriteOutcome::ConflictIgnored`](crate::model::WriteOutcome).
#[derive(Error, Debug)]
pub enum SwiftError {
    #[error("Malformed record{}: {reason}", record_position(.index))]
    MalformedRecord { index: Option<usize>, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[source] DbError),

    #[error("Transaction aborted at {}: {source}", abort_point(.record))]
    TransactionAborted {
        record: Option<String>,
        source: DbError,
    },

    /// The entity row is committed; its branch link or repair step is not.
    #[error("SWIFT code {code} was stored but linking it failed: {source}")]
    PartialInsert { code: String, source: DbError },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for hierarchy operations.
pub type SwiftResult<T> = Result<T, SwiftError>;

fn record_position(index: &Option<usize>) -> String {
    index.map(|i| format!(" #{}", i)).unwrap_or_default()
}

fn abort_point(record: &Option<String>) -> String {
    match record {
        Some(code) => format!("record {}", code),
        None => "commit".to_string(),
    }
}

impl From<DbError> for SwiftError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(what) => Self::NotFound(what),
            other => Self::StoreUnavailable(other),
        }
    }
}

impl SwiftError {
    /// Create a malformed record error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            index: None,
            reason: reason.into(),
        }
    }

    /// Attach the position of the offending record in a batch.
    pub fn at_record(self, position: usize) -> Self {
        match self {
            Self::MalformedRecord { reason, .. } => Self::MalformedRecord {
                index: Some(position),
                reason,
            },
            other => other,
        }
    }

    /// Whether this is a query miss rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the store itself failed (driver error, rollback, partial write).
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable(_) | Self::TransactionAborted { .. } | Self::PartialInsert { .. }
        )
    }
}
