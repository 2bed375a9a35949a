//! Stateless geometry routes: measure and overlay shapes sent by the editor.
//!
//! Each request builds a throwaway [`Session`] from the body, selects every
//! shape in document order, and runs one operation. Nothing is persisted;
//! the editor saves a result through `/add_feature` if it wants to keep it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use shapes::{Measurement, Session, SessionError, Shape, format_area, format_length};

#[derive(Debug, Serialize)]
pub struct MeasureResponse {
    pub id: u64,
    pub name: Option<String>,
    #[serde(flatten)]
    pub measurement: Measurement,
    /// Formatted area, e.g. `1.20 km² (120.00 ha)`.
    pub area: String,
    /// Formatted length or perimeter.
    pub length: String,
    pub summary: String,
}

fn to_response(shape: &Shape) -> MeasureResponse {
    let measurement = Measurement::of(shape);
    MeasureResponse {
        id: shape.id,
        name: shape.name.clone(),
        measurement,
        area: format_area(measurement.area_m2),
        length: format_length(measurement.length_m),
        summary: measurement.to_string(),
    }
}

/// `POST /api/measure`: measure every shape in the body.
pub async fn measure(body: String) -> Result<Json<Vec<MeasureResponse>>, (StatusCode, String)> {
    let session = load_session(&body)?;
    Ok(Json(session.shapes().iter().map(to_response).collect()))
}

/// `POST /api/intersect`: overlap of exactly two polygons; 204 if disjoint.
pub async fn intersect(body: String) -> Result<Response, (StatusCode, String)> {
    let mut session = load_session(&body)?;
    session.select_all();
    let result = session.intersect_selected().map_err(session_error_response)?;
    Ok(overlay_response(result))
}

/// `POST /api/clip`: first shape clipped by the second; 204 if nothing remains.
pub async fn clip(body: String) -> Result<Response, (StatusCode, String)> {
    let mut session = load_session(&body)?;
    session.select_all();
    let result = session.clip_selected().map_err(session_error_response)?;
    Ok(overlay_response(result))
}

/// `POST /api/dissolve`: union of two or more polygons.
pub async fn dissolve(body: String) -> Result<Response, (StatusCode, String)> {
    let mut session = load_session(&body)?;
    session.select_all();
    let shape = session.dissolve_selected().map_err(session_error_response)?;
    Ok(Json(shape.to_feature()).into_response())
}

fn load_session(body: &str) -> Result<Session, (StatusCode, String)> {
    let shapes = shapes::parse_shapes(body).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let mut session = Session::new();
    session.load(shapes);
    Ok(session)
}

fn overlay_response(result: Option<&Shape>) -> Response {
    match result {
        Some(shape) => Json(shape.to_feature()).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

pub(crate) fn session_error_to_status(err: &SessionError) -> StatusCode {
    match err {
        SessionError::Shape(_) => StatusCode::BAD_REQUEST,
        SessionError::UnknownShape(_)
        | SessionError::SelectionSize { .. }
        | SessionError::SelectionTooSmall { .. }
        | SessionError::Overlay(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn session_error_response(err: SessionError) -> (StatusCode, String) {
    (session_error_to_status(&err), err.to_string())
}

#[cfg(test)]
#[path = "geometry_test.rs"]
mod tests;
