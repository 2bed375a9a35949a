//! Drawn shapes and their GeoJSON representation.

use geo::Geometry;
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

/// Error returned when GeoJSON input cannot become a [`Shape`].
#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("feature has no geometry")]
    MissingGeometry,
    #[error("unsupported geometry type: {0}")]
    Unsupported(&'static str),
}

/// The three kinds of layer a user can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Point,
    Line,
    Polygon,
}

impl ShapeKind {
    /// Classify a geometry. Multi-geometries share the kind of their members.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` for geometry collections.
    pub fn of(geometry: &Geometry<f64>) -> Result<Self, ShapeError> {
        match geometry {
            Geometry::Point(_) | Geometry::MultiPoint(_) => Ok(Self::Point),
            Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => Ok(Self::Line),
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => {
                Ok(Self::Polygon)
            }
            Geometry::GeometryCollection(_) => Err(ShapeError::Unsupported("GeometryCollection")),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Line => "line",
            Self::Polygon => "polygon",
        }
    }
}

/// One drawn layer. Lives only as long as the session holding it.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: u64,
    pub name: Option<String>,
    pub kind: ShapeKind,
    pub geometry: Geometry<f64>,
}

impl Shape {
    /// Build a shape, classifying its geometry.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` if the geometry is not a point, line, or polygon.
    pub fn new(id: u64, geometry: Geometry<f64>, name: Option<String>) -> Result<Self, ShapeError> {
        let kind = ShapeKind::of(&geometry)?;
        Ok(Self { id, name, kind, geometry })
    }

    /// Convert a GeoJSON feature. The `name` property, when a string, becomes
    /// the shape name. The returned shape has id 0.
    ///
    /// # Errors
    ///
    /// Returns `MissingGeometry` for features without geometry and
    /// `GeoJson`/`Unsupported` for geometries that cannot be converted.
    pub fn from_feature(feature: Feature) -> Result<Self, ShapeError> {
        let name = feature
            .property("name")
            .and_then(JsonValue::as_str)
            .map(str::to_owned);
        let geometry = feature.geometry.ok_or(ShapeError::MissingGeometry)?;
        let geometry = Geometry::<f64>::try_from(geometry)?;
        Self::new(0, geometry, name)
    }

    #[must_use]
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    /// Render as a GeoJSON feature carrying `name` in its properties.
    #[must_use]
    pub fn to_feature(&self) -> Feature {
        let properties = self.name.as_ref().map(|name| {
            let mut props = JsonObject::new();
            props.insert("name".to_owned(), JsonValue::from(name.as_str()));
            props
        });
        Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(&self.geometry))),
            id: Some(Id::Number(self.id.into())),
            properties,
            foreign_members: None,
        }
    }
}

/// Flatten any GeoJSON object into shapes, numbering them from 1 in input order.
///
/// # Errors
///
/// Fails on the first feature that cannot be converted.
pub fn shapes_from_geojson(geojson: GeoJson) -> Result<Vec<Shape>, ShapeError> {
    let features = match geojson {
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Geometry(geometry) => vec![Feature::from(geometry)],
    };

    (1_u64..)
        .zip(features)
        .map(|(id, feature)| Shape::from_feature(feature).map(|shape| shape.with_id(id)))
        .collect()
}

/// Parse GeoJSON text (Feature, FeatureCollection, or bare Geometry).
///
/// # Errors
///
/// Returns `GeoJson` for malformed text, otherwise see [`shapes_from_geojson`].
pub fn parse_shapes(text: &str) -> Result<Vec<Shape>, ShapeError> {
    shapes_from_geojson(text.parse::<GeoJson>()?)
}

#[must_use]
pub fn feature_collection<'a>(shapes: impl IntoIterator<Item = &'a Shape>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: shapes.into_iter().map(Shape::to_feature).collect(),
        foreign_members: None,
    }
}

#[cfg(test)]
#[path = "shape_test.rs"]
mod tests;
