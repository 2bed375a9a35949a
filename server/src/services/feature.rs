//! Feature store: digitized shapes persisted in the PostGIS `feature` table.
//!
//! DESIGN
//! ======
//! Geometry crosses the database boundary as GeoJSON text in both
//! directions (`ST_GeomFromGeoJSON` on insert, `ST_AsGeoJSON` on read), so
//! no PostGIS binary types leak into Rust. Every non-geometry column is
//! exposed as a feature property.

use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};
use sqlx::PgPool;

use shapes::Shape;

/// Name stored when the submitted feature carries none.
pub const DEFAULT_FEATURE_NAME: &str = "Hasil Digitasi";

#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    #[error("feature has no geometry")]
    MissingGeometry,
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One `feature` row as selected for GeoJSON output.
#[derive(Debug, Clone)]
pub struct FeatureRow {
    pub id: i64,
    pub geometry: Option<JsonValue>,
    pub properties: JsonValue,
}

/// Load every stored feature as a `FeatureCollection`, ordered by id.
///
/// # Errors
///
/// Returns a database error if the query fails, or `InvalidGeometry` if
/// PostGIS hands back GeoJSON that does not parse.
pub async fn list_features(pool: &PgPool) -> Result<FeatureCollection, FeatureError> {
    let rows = sqlx::query_as::<_, (i64, Option<JsonValue>, JsonValue)>(
        "SELECT f.id, ST_AsGeoJSON(f.geom)::jsonb, to_jsonb(f) - 'geom'
         FROM feature AS f
         ORDER BY f.id ASC",
    )
    .fetch_all(pool)
    .await?;

    let features = rows
        .into_iter()
        .map(|(id, geometry, properties)| row_to_feature(FeatureRow { id, geometry, properties }))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeatureCollection { bbox: None, features, foreign_members: None })
}

/// Convert a selected row into a GeoJSON feature.
///
/// # Errors
///
/// Returns `InvalidGeometry` if the geometry JSON is not valid GeoJSON.
pub fn row_to_feature(row: FeatureRow) -> Result<Feature, FeatureError> {
    let geometry = row
        .geometry
        .map(serde_json::from_value::<geojson::Geometry>)
        .transpose()
        .map_err(|e| FeatureError::InvalidGeometry(e.to_string()))?;

    let properties = match row.properties {
        JsonValue::Object(map) => Some(map),
        _ => None,
    };

    Ok(Feature {
        bbox: None,
        geometry,
        id: Some(geojson::feature::Id::Number(row.id.into())),
        properties,
        foreign_members: None,
    })
}

/// Name to store for a submitted feature.
#[must_use]
pub fn feature_name(properties: Option<&JsonObject>) -> String {
    properties
        .and_then(|props| props.get("name"))
        .and_then(JsonValue::as_str)
        .unwrap_or(DEFAULT_FEATURE_NAME)
        .to_owned()
}

/// Validate a submitted feature and return `(name, geometry_json)` for insert.
///
/// # Errors
///
/// Returns `MissingGeometry` or `InvalidGeometry` when the feature is not a
/// point, line, or polygon.
pub fn prepare_insert(feature: &Feature) -> Result<(String, String), FeatureError> {
    let geometry = feature.geometry.as_ref().ok_or(FeatureError::MissingGeometry)?;
    Shape::from_feature(feature.clone()).map_err(|e| FeatureError::InvalidGeometry(e.to_string()))?;
    let geometry_json = serde_json::to_string(geometry).map_err(|e| FeatureError::InvalidGeometry(e.to_string()))?;
    Ok((feature_name(feature.properties.as_ref()), geometry_json))
}

/// Insert a digitized feature and return its new id.
///
/// # Errors
///
/// Returns validation errors from [`prepare_insert`] or a database error.
pub async fn insert_feature(pool: &PgPool, feature: &Feature) -> Result<i64, FeatureError> {
    let (name, geometry_json) = prepare_insert(feature)?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO feature (name, geom)
         VALUES ($1, ST_SetSRID(ST_GeomFromGeoJSON($2), 4326))
         RETURNING id",
    )
    .bind(&name)
    .bind(&geometry_json)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

#[cfg(test)]
#[path = "feature_test.rs"]
mod tests;
