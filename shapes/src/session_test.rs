use super::*;
use geo::{Area, LineString, Point, polygon};

use crate::shape::ShapeKind;

fn square(x0: f64, y0: f64, size: f64) -> Geometry<f64> {
    Geometry::Polygon(polygon![
        (x: x0, y: y0),
        (x: x0 + size, y: y0),
        (x: x0 + size, y: y0 + size),
        (x: x0, y: y0 + size),
        (x: x0, y: y0),
    ])
}

fn session_with_two_squares() -> (Session, u64, u64) {
    let mut session = Session::new();
    let a = session.draw(square(0.0, 0.0, 2.0), None).unwrap();
    let b = session.draw(square(1.0, 1.0, 2.0), Some("b".into())).unwrap();
    (session, a, b)
}

// =============================================================================
// LAYERS
// =============================================================================

#[test]
fn new_session_is_empty() {
    let session = Session::new();
    assert!(session.is_empty());
    assert!(session.selected().is_empty());
    assert_eq!(session.to_feature_collection().features.len(), 0);
}

#[test]
fn ids_increase_and_are_not_reused() {
    let mut session = Session::new();
    let a = session.draw(Geometry::Point(Point::new(0.0, 0.0)), None).unwrap();
    let b = session.draw(Geometry::Point(Point::new(1.0, 1.0)), None).unwrap();
    assert_eq!((a, b), (1, 2));

    session.remove(b);
    let c = session.draw(Geometry::Point(Point::new(2.0, 2.0)), None).unwrap();
    assert_eq!(c, 3);
    assert_eq!(session.len(), 2);
}

#[test]
fn draw_rejects_geometry_collection() {
    let mut session = Session::new();
    let err = session
        .draw(Geometry::GeometryCollection(geo::GeometryCollection(vec![])), None)
        .unwrap_err();
    assert!(matches!(err, SessionError::Shape(ShapeError::Unsupported(_))));
    assert!(session.is_empty());
}

#[test]
fn load_reassigns_ids() {
    let mut session = Session::new();
    session.draw(Geometry::Point(Point::new(0.0, 0.0)), None).unwrap();
    let parsed = vec![
        Shape::new(1, square(0.0, 0.0, 1.0), None).unwrap(),
        Shape::new(2, square(2.0, 0.0, 1.0), None).unwrap(),
    ];
    assert_eq!(session.load(parsed), vec![2, 3]);
    assert_eq!(session.get(3).map(|s| s.kind), Some(ShapeKind::Polygon));
}

#[test]
fn clear_drops_shapes_and_selection() {
    let (mut session, a, _) = session_with_two_squares();
    session.select(a).unwrap();
    session.clear();
    assert!(session.is_empty());
    assert!(session.selected().is_empty());
}

// =============================================================================
// SELECTION
// =============================================================================

#[test]
fn selection_keeps_order_without_duplicates() {
    let (mut session, a, b) = session_with_two_squares();
    session.select(b).unwrap();
    session.select(a).unwrap();
    session.select(b).unwrap();
    assert_eq!(session.selected(), &[b, a]);

    session.deselect(b);
    assert_eq!(session.selected(), &[a]);
}

#[test]
fn select_unknown_shape_fails() {
    let mut session = Session::new();
    assert!(matches!(session.select(42), Err(SessionError::UnknownShape(42))));
}

#[test]
fn remove_drops_from_selection() {
    let (mut session, a, b) = session_with_two_squares();
    session.select_all();
    let removed = session.remove(a).unwrap();
    assert_eq!(removed.id, a);
    assert_eq!(session.selected(), &[b]);
    assert!(session.remove(a).is_none());
}

// =============================================================================
// MEASURE
// =============================================================================

#[test]
fn measure_known_and_unknown() {
    let (session, a, _) = session_with_two_squares();
    let m = session.measure(a).unwrap();
    assert_eq!(m.kind, ShapeKind::Polygon);
    assert!(m.area_m2 > 0.0);
    assert!(matches!(session.measure(99), Err(SessionError::UnknownShape(99))));
}

#[test]
fn measure_selected_follows_selection() {
    let (mut session, a, b) = session_with_two_squares();
    session.select(b).unwrap();
    session.select(a).unwrap();
    let ids = session.measure_selected().into_iter().map(|(id, _)| id).collect::<Vec<_>>();
    assert_eq!(ids, vec![b, a]);
}

// =============================================================================
// OVERLAY
// =============================================================================

#[test]
fn intersect_selected_adds_result_shape() {
    let (mut session, _, _) = session_with_two_squares();
    session.select_all();
    let result = session.intersect_selected().unwrap().expect("overlap").clone();
    assert_eq!(result.id, 3);
    assert_eq!(result.name.as_deref(), Some("intersect"));
    assert!((result.geometry.unsigned_area() - 1.0).abs() < 1e-9);
    assert_eq!(session.len(), 3);
}

#[test]
fn intersect_disjoint_adds_nothing() {
    let mut session = Session::new();
    session.draw(square(0.0, 0.0, 1.0), None).unwrap();
    session.draw(square(5.0, 5.0, 1.0), None).unwrap();
    session.select_all();
    assert!(session.intersect_selected().unwrap().is_none());
    assert_eq!(session.len(), 2);
}

#[test]
fn intersect_requires_exactly_two() {
    let (mut session, a, _) = session_with_two_squares();
    session.select(a).unwrap();
    assert!(matches!(
        session.intersect_selected(),
        Err(SessionError::SelectionSize { expected: 2, actual: 1 })
    ));
}

#[test]
fn clip_uses_selection_order() {
    let mut session = Session::new();
    let mask = session.draw(square(0.0, 0.0, 2.0), None).unwrap();
    let line = session
        .draw(Geometry::LineString(LineString::from(vec![(-1.0, 1.0), (3.0, 1.0)])), None)
        .unwrap();

    session.select(line).unwrap();
    session.select(mask).unwrap();
    let clipped = session.clip_selected().unwrap().expect("line crosses mask");
    assert_eq!(clipped.kind, ShapeKind::Line);

    session.clear_selection();
    session.select(mask).unwrap();
    session.select(line).unwrap();
    assert!(matches!(session.clip_selected(), Err(SessionError::Overlay(OverlayError::NotPolygonal(_)))));
}

#[test]
fn dissolve_selected_merges_polygons() {
    let (mut session, _, _) = session_with_two_squares();
    session.select_all();
    let merged = session.dissolve_selected().unwrap();
    assert_eq!(merged.name.as_deref(), Some("dissolve"));
    assert!((merged.geometry.unsigned_area() - 7.0).abs() < 1e-9);
}

#[test]
fn dissolve_needs_two_selected() {
    let (mut session, a, _) = session_with_two_squares();
    session.select(a).unwrap();
    assert!(matches!(
        session.dissolve_selected(),
        Err(SessionError::SelectionTooSmall { minimum: 2, actual: 1 })
    ));
}

#[test]
fn feature_collection_includes_results() {
    let (mut session, _, _) = session_with_two_squares();
    session.select_all();
    session.dissolve_selected().unwrap();
    let fc = session.to_feature_collection();
    assert_eq!(fc.features.len(), 3);
}
