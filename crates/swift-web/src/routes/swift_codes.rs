//! SWIFT code route handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use swift_core::model::{CountrySwiftCodes, SwiftCodeDetails, WriteOutcome};
use swift_core::normalize::RawRecord;
use swift_core::query;

use super::{api_error, blocking, ApiError};
use crate::state::AppState;

pub async fn get_swift_code(
    State(state): State<AppState>,
    Path(swift_code): Path<String>,
) -> Result<Json<SwiftCodeDetails>, ApiError> {
    let details = blocking(&state, move |db, _| query::fetch_by_code(db, &swift_code)).await?;
    Ok(Json(details))
}

pub async fn get_by_country(
    State(state): State<AppState>,
    Path(country_iso2): Path<String>,
) -> Result<Json<CountrySwiftCodes>, ApiError> {
    let country = blocking(&state, move |db, _| query::fetch_by_country(db, &country_iso2)).await?;
    Ok(Json(country))
}

pub async fn create_swift_code(
    State(state): State<AppState>,
    body: Result<Json<RawRecord>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(record) = body.map_err(|e| {
        tracing::debug!(error = %e, "Rejected insert body");
        api_error(StatusCode::BAD_REQUEST, format!("Invalid request: {}", e.body_text()))
    })?;

    let outcome = blocking(&state, move |db, mutator| mutator.insert(db, &record)).await?;

    let message = match outcome.write {
        WriteOutcome::Inserted => "SWIFT code inserted successfully",
        WriteOutcome::ConflictIgnored => "SWIFT code already exists, insert ignored",
    };
    Ok(Json(json!({ "message": message, "outcome": outcome })))
}

pub async fn delete_swift_code(
    State(state): State<AppState>,
    Path(swift_code): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let outcome = blocking(&state, move |db, mutator| mutator.delete(db, &swift_code)).await?;

    Ok(Json(json!({
        "message": "SWIFT code deleted successfully",
        "outcome": outcome,
    })))
}
