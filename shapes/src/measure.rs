//! Geodesic measurement of drawn shapes.
//!
//! Coordinates are WGS84 lon/lat. Area and length are computed on the
//! ellipsoid (Karney's algorithm via `geo`), so results are in metres
//! regardless of latitude.

use std::fmt;

use geo::orient::{Direction, Orient};
use geo::{GeodesicArea, GeodesicLength, Geometry, Polygon};
use serde::Serialize;

use crate::shape::{Shape, ShapeKind};

const SQUARE_METRES_PER_HECTARE: f64 = 10_000.0;
const SQUARE_METRES_PER_KM2: f64 = 1_000_000.0;
const METRES_PER_KM: f64 = 1_000.0;

/// Unsigned geodesic area in m². Points and lines have no area.
#[must_use]
pub fn area_m2(geometry: &Geometry<f64>) -> f64 {
    match geometry {
        Geometry::Polygon(polygon) => polygon_area_m2(polygon),
        Geometry::MultiPolygon(multi) => multi.0.iter().map(polygon_area_m2).sum(),
        Geometry::Rect(rect) => polygon_area_m2(&rect.to_polygon()),
        Geometry::Triangle(triangle) => polygon_area_m2(&triangle.to_polygon()),
        Geometry::GeometryCollection(collection) => collection.0.iter().map(area_m2).sum(),
        Geometry::Point(_)
        | Geometry::MultiPoint(_)
        | Geometry::Line(_)
        | Geometry::LineString(_)
        | Geometry::MultiLineString(_) => 0.0,
    }
}

/// The geodesic area of a clockwise ring is the rest of the ellipsoid, so
/// rings are brought to counter-clockwise exterior / clockwise holes first.
fn polygon_area_m2(polygon: &Polygon<f64>) -> f64 {
    polygon.orient(Direction::Default).geodesic_area_unsigned()
}

/// Geodesic length in metres: path length for lines, ring perimeter for polygons.
#[must_use]
pub fn length_m(geometry: &Geometry<f64>) -> f64 {
    match geometry {
        Geometry::Line(line) => line.geodesic_length(),
        Geometry::LineString(line) => line.geodesic_length(),
        Geometry::MultiLineString(multi) => multi.geodesic_length(),
        Geometry::Polygon(polygon) => perimeter_m(polygon),
        Geometry::MultiPolygon(multi) => multi.0.iter().map(perimeter_m).sum(),
        Geometry::Rect(rect) => perimeter_m(&rect.to_polygon()),
        Geometry::Triangle(triangle) => perimeter_m(&triangle.to_polygon()),
        Geometry::GeometryCollection(collection) => collection.0.iter().map(length_m).sum(),
        Geometry::Point(_) | Geometry::MultiPoint(_) => 0.0,
    }
}

fn perimeter_m(polygon: &Polygon<f64>) -> f64 {
    let holes: f64 = polygon.interiors().iter().map(|ring| ring.geodesic_length()).sum();
    polygon.exterior().geodesic_length() + holes
}

/// Measurements for a single shape, as shown in the editor's result popup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub kind: ShapeKind,
    pub area_m2: f64,
    pub length_m: f64,
}

impl Measurement {
    #[must_use]
    pub fn of(shape: &Shape) -> Self {
        Self { kind: shape.kind, area_m2: area_m2(&shape.geometry), length_m: length_m(&shape.geometry) }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ShapeKind::Point => write!(f, "point"),
            ShapeKind::Line => write!(f, "line, length {}", format_length(self.length_m)),
            ShapeKind::Polygon => write!(
                f,
                "polygon, area {}, perimeter {}",
                format_area(self.area_m2),
                format_length(self.length_m)
            ),
        }
    }
}

/// Human-readable area: m² below one km², km² above; hectares from 1 ha up.
#[must_use]
pub fn format_area(area_m2: f64) -> String {
    let base = if area_m2 >= SQUARE_METRES_PER_KM2 {
        format!("{:.2} km²", area_m2 / SQUARE_METRES_PER_KM2)
    } else {
        format!("{area_m2:.2} m²")
    };
    if area_m2 >= SQUARE_METRES_PER_HECTARE {
        format!("{base} ({:.2} ha)", area_m2 / SQUARE_METRES_PER_HECTARE)
    } else {
        base
    }
}

#[must_use]
pub fn format_length(length_m: f64) -> String {
    if length_m >= METRES_PER_KM {
        format!("{:.2} km", length_m / METRES_PER_KM)
    } else {
        format!("{length_m:.2} m")
    }
}

#[cfg(test)]
#[path = "measure_test.rs"]
mod tests;
