//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The map page and its assets are plain static files under `STATIC_DIR`,
//! served as the router fallback. Everything the page calls (the feature
//! feed, the save/upload/download endpoints, and the geometry API) is
//! registered here under a single Axum router with one shared `AppState`.

pub mod features;
pub mod geometry;
pub mod shapefile;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::handler::HandlerWithoutStateExt;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Anything the static directory cannot answer (including POSTs to
    // unknown paths) ends up here.
    let static_files = ServeDir::new(&state.config.static_dir)
        .append_index_html_on_directories(true)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(endpoint_not_found.into_service());

    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/data.geojson", get(features::get_geojson))
        .route("/add_feature", post(features::add_feature))
        .route("/upload", post(shapefile::upload).layer(upload_limit))
        .route("/download", get(shapefile::download))
        .route("/api/measure", post(geometry::measure))
        .route("/api/intersect", post(geometry::intersect))
        .route("/api/clip", post(geometry::clip))
        .route("/api/dissolve", post(geometry::dissolve))
        .route("/healthz", get(healthz))
        .fallback_service(static_files)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn endpoint_not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Endpoint not found")
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
