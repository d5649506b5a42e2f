//! Application state.

use std::sync::Arc;
use swift_core::mutate::Mutator;
use swift_db::DbPool;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub mutator: Mutator,
}

impl AppState {
    pub fn new(db: Arc<DbPool>, mutator: Mutator) -> Self {
        Self { db, mutator }
    }
}
