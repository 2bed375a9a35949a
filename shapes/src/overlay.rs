//! Overlay operations on selected shapes: intersect, clip, dissolve.
//!
//! All polygon boolean work goes through `geo::BooleanOps`. Results are
//! normalized so a single-member multi-geometry comes back as its member,
//! and an empty result is reported as `None` rather than an empty geometry.

use geo::{Area, BooleanOps, Contains, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OverlayError {
    #[error("{0} must be a polygon")]
    NotPolygonal(&'static str),
    #[error("need at least {required} shapes, got {actual}")]
    NotEnoughShapes { required: usize, actual: usize },
}

/// Area shared by two polygons. `None` when they do not overlap.
///
/// # Errors
///
/// Returns `NotPolygonal` if either input is not a polygon.
pub fn intersect(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<Option<Geometry<f64>>, OverlayError> {
    let a = polygons(a).ok_or(OverlayError::NotPolygonal("first shape"))?;
    let b = polygons(b).ok_or(OverlayError::NotPolygonal("second shape"))?;
    Ok(normalize_polygons(a.intersection(&b)))
}

/// Part of `subject` lying inside `mask`. `None` when nothing remains.
///
/// # Errors
///
/// Returns `NotPolygonal` if the mask is not a polygon, or if the subject is
/// a geometry collection.
pub fn clip(subject: &Geometry<f64>, mask: &Geometry<f64>) -> Result<Option<Geometry<f64>>, OverlayError> {
    let mask = polygons(mask).ok_or(OverlayError::NotPolygonal("clip mask"))?;

    if let Some(subject) = polygons(subject) {
        return Ok(normalize_polygons(subject.intersection(&mask)));
    }

    match subject {
        Geometry::Point(point) => Ok(mask.contains(point).then_some(Geometry::Point(*point))),
        Geometry::MultiPoint(points) => {
            let inside = points
                .iter()
                .filter(|point| mask.contains(*point))
                .copied()
                .collect::<Vec<Point<f64>>>();
            Ok(normalize_points(inside))
        }
        Geometry::Line(line) => Ok(clip_lines(&mask, MultiLineString::new(vec![LineString::from(*line)]))),
        Geometry::LineString(line) => Ok(clip_lines(&mask, MultiLineString::new(vec![line.clone()]))),
        Geometry::MultiLineString(lines) => Ok(clip_lines(&mask, lines.clone())),
        _ => Err(OverlayError::NotPolygonal("clip subject")),
    }
}

fn clip_lines(mask: &MultiPolygon<f64>, lines: MultiLineString<f64>) -> Option<Geometry<f64>> {
    let mut inside = mask.clip(&lines, false);
    inside.0.retain(|line| line.0.len() >= 2);
    match inside.0.len() {
        0 => None,
        1 => inside.0.pop().map(Geometry::LineString),
        _ => Some(Geometry::MultiLineString(inside)),
    }
}

/// Union of every input polygon.
///
/// # Errors
///
/// Returns `NotEnoughShapes` for fewer than two inputs and `NotPolygonal`
/// when any input is not a polygon.
pub fn dissolve<'a, I>(geometries: I) -> Result<Geometry<f64>, OverlayError>
where
    I: IntoIterator<Item = &'a Geometry<f64>>,
{
    let inputs = geometries
        .into_iter()
        .map(|geometry| polygons(geometry).ok_or(OverlayError::NotPolygonal("dissolved shape")))
        .collect::<Result<Vec<_>, _>>()?;

    if inputs.len() < 2 {
        return Err(OverlayError::NotEnoughShapes { required: 2, actual: inputs.len() });
    }

    Ok(inputs
        .into_iter()
        .reduce(|merged, next| merged.union(&next))
        .and_then(normalize_polygons)
        .unwrap_or_else(|| Geometry::MultiPolygon(MultiPolygon::new(Vec::new()))))
}

/// View a geometry as a multipolygon, if it is polygonal at all.
fn polygons(geometry: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(polygon) => Some(MultiPolygon::new(vec![polygon.clone()])),
        Geometry::MultiPolygon(multi) => Some(multi.clone()),
        Geometry::Rect(rect) => Some(MultiPolygon::new(vec![rect.to_polygon()])),
        Geometry::Triangle(triangle) => Some(MultiPolygon::new(vec![triangle.to_polygon()])),
        _ => None,
    }
}

fn normalize_polygons(mut multi: MultiPolygon<f64>) -> Option<Geometry<f64>> {
    // Touching edges can leave zero-area slivers behind.
    multi.0.retain(|polygon: &Polygon<f64>| polygon.unsigned_area() > 0.0);
    match multi.0.len() {
        0 => None,
        1 => multi.0.pop().map(Geometry::Polygon),
        _ => Some(Geometry::MultiPolygon(multi)),
    }
}

fn normalize_points(mut points: Vec<Point<f64>>) -> Option<Geometry<f64>> {
    match points.len() {
        0 => None,
        1 => points.pop().map(Geometry::Point),
        _ => Some(Geometry::MultiPoint(MultiPoint::new(points))),
    }
}

#[cfg(test)]
#[path = "overlay_test.rs"]
mod tests;
