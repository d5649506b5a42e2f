//! Route handlers.

pub mod swift_codes;

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};
use swift_core::mutate::Mutator;
use swift_core::{SwiftError, SwiftResult};
use swift_db::DbPool;

use crate::state::AppState;

/// Error response: status plus `{"error": "..."}` body.
pub type ApiError = (StatusCode, Json<Value>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

/// Map a core error to its HTTP status. Misses and bad input never share a
/// status with store failures.
pub(crate) fn from_swift_error(err: SwiftError) -> ApiError {
    let status = match &err {
        SwiftError::NotFound(_) => StatusCode::NOT_FOUND,
        SwiftError::MalformedRecord { .. } | SwiftError::Json(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        // Driver detail stays in the log.
        tracing::error!(error = %err, "Request failed");
        return api_error(status, "Internal server error");
    }
    api_error(status, err.to_string())
}

/// Run a store operation on the blocking thread pool.
pub(crate) async fn blocking<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&DbPool, &Mutator) -> SwiftResult<T> + Send + 'static,
    T: Send + 'static,
{
    let db = state.db.clone();
    let mutator = state.mutator.clone();
    tokio::task::spawn_blocking(move || op(&db, &mutator))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Store task did not complete");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        })?
        .map_err(from_swift_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use swift_db::DbError;

    #[test]
    fn test_store_failure_hides_driver_text() {
        let err = SwiftError::PartialInsert {
            code: "PKOPPLPW002".to_string(),
            source: DbError::Migration("no such table: branches".to_string()),
        };
        let (status, Json(body)) = from_swift_error(err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn test_client_errors_keep_their_message() {
        let (status, Json(body)) = from_swift_error(SwiftError::NotFound("SWIFT code: X".to_string()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found: SWIFT code: X");

        let (status, _) = from_swift_error(SwiftError::malformed("missing bank name"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
