//! Feature store routes: the GeoJSON layer feed and the digitizer's save call.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use geojson::{Feature, FeatureCollection};
use tracing::{error, info};

use crate::services::feature::{self, FeatureError};
use crate::state::AppState;

/// Plain-text reply shown to the user after a successful save.
pub const SAVED_MESSAGE: &str = "Fitur baru berhasil disimpan ke PostGIS.";

/// `GET /data.geojson`: every stored feature as a FeatureCollection.
pub async fn get_geojson(State(state): State<AppState>) -> Result<Json<FeatureCollection>, (StatusCode, String)> {
    let collection = feature::list_features(&state.pool)
        .await
        .map_err(feature_error_response)?;
    Ok(Json(collection))
}

/// `POST /add_feature`: persist one GeoJSON Feature from the editor.
///
/// The body is read as text so clients need not set a JSON content type.
pub async fn add_feature(State(state): State<AppState>, body: String) -> Result<&'static str, (StatusCode, String)> {
    let feature = parse_feature(&body)?;
    let id = feature::insert_feature(&state.pool, &feature)
        .await
        .map_err(feature_error_response)?;
    info!(id, "feature saved");
    Ok(SAVED_MESSAGE)
}

pub(crate) fn parse_feature(body: &str) -> Result<Feature, (StatusCode, String)> {
    serde_json::from_str::<Feature>(body)
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("invalid GeoJSON Feature: {e}")))
}

pub(crate) fn feature_error_to_status(err: &FeatureError) -> StatusCode {
    match err {
        FeatureError::MissingGeometry | FeatureError::InvalidGeometry(_) => StatusCode::BAD_REQUEST,
        FeatureError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn feature_error_response(err: FeatureError) -> (StatusCode, String) {
    let status = feature_error_to_status(&err);
    if status.is_server_error() {
        error!(error = %err, "feature store request failed");
    }
    (status, err.to_string())
}

#[cfg(test)]
#[path = "features_test.rs"]
mod tests;
