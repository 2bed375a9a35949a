//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the database pool and the read-only configuration. Drawn shapes
//! are never held server-side; every request carries its own GeoJSON.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; the pool is internally reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, config: Config) -> Self {
        Self { pool, config: Arc::new(config) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
