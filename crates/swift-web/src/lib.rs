//! SwiftCodes Web Server
//!
//! Axum-based REST API over the SWIFT code hierarchy.

pub mod routes;
pub mod state;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use swift_core::mutate::Mutator;
use swift_db::DbPool;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/swift-codes", post(routes::swift_codes::create_swift_code))
        .route("/swift-codes/{swift_code}", get(routes::swift_codes::get_swift_code))
        .route("/swift-codes/{swift_code}", delete(routes::swift_codes::delete_swift_code))
        .route(
            "/swift-codes/country/{country_iso2}",
            get(routes::swift_codes::get_by_country),
        )
        .with_state(state);

    Router::new()
        .nest("/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Run the web server.
pub async fn run_server(db: Arc<DbPool>, mutator: Mutator, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(db, mutator);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("Web server listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}
