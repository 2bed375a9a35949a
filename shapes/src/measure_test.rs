use super::*;
use geo::{LineString, MultiPoint, Point, polygon};

fn square(size: f64) -> Geometry<f64> {
    Geometry::Polygon(polygon![
        (x: 0.0, y: 0.0),
        (x: size, y: 0.0),
        (x: size, y: size),
        (x: 0.0, y: size),
        (x: 0.0, y: 0.0),
    ])
}

fn close_to(actual: f64, expected: f64, rel: f64) -> bool {
    ((actual - expected) / expected).abs() < rel
}

#[test]
fn small_equatorial_square_area() {
    // ~111.32 m of longitude by ~110.57 m of latitude.
    let area = area_m2(&square(0.001));
    assert!(close_to(area, 12_309.0, 0.01), "area was {area}");
}

#[test]
fn area_ignores_winding_order() {
    let cw = Geometry::Polygon(polygon![
        (x: 0.0, y: 0.0),
        (x: 0.0, y: 0.001),
        (x: 0.001, y: 0.001),
        (x: 0.001, y: 0.0),
        (x: 0.0, y: 0.0),
    ]);
    assert!(close_to(area_m2(&cw), area_m2(&square(0.001)), 1e-9));
}

#[test]
fn large_clockwise_polygon_is_not_rest_of_earth() {
    let ccw = Geometry::Polygon(polygon![
        (x: 106.0, y: -7.0),
        (x: 107.0, y: -7.0),
        (x: 107.0, y: -6.0),
        (x: 106.0, y: -6.0),
        (x: 106.0, y: -7.0),
    ]);
    let cw = Geometry::Polygon(polygon![
        (x: 106.0, y: -7.0),
        (x: 106.0, y: -6.0),
        (x: 107.0, y: -6.0),
        (x: 107.0, y: -7.0),
        (x: 106.0, y: -7.0),
    ]);
    let area = area_m2(&cw);
    assert!(close_to(area, 12_232_195_514.8, 0.001), "area was {area}");
    assert!(close_to(area, area_m2(&ccw), 1e-9));
}

fn ring(x0: f64, y0: f64, size: f64) -> LineString<f64> {
    LineString::from(vec![(x0, y0), (x0 + size, y0), (x0 + size, y0 + size), (x0, y0 + size), (x0, y0)])
}

#[test]
fn hole_is_subtracted_from_area_and_added_to_perimeter() {
    let outer = ring(0.0, 0.0, 0.002);
    let inner = ring(0.0005, 0.0005, 0.001);
    // Both rings counter-clockwise; the hole gets reoriented before measuring.
    let holed = Geometry::Polygon(Polygon::new(outer.clone(), vec![inner.clone()]));
    let outer_only = Geometry::Polygon(Polygon::new(outer, vec![]));
    let inner_only = Geometry::Polygon(Polygon::new(inner, vec![]));

    let area = area_m2(&holed);
    let expected = area_m2(&outer_only) - area_m2(&inner_only);
    assert!(close_to(area, expected, 1e-6), "area was {area}, expected {expected}");
    assert!(close_to(area, 36_927.0, 0.01), "area was {area}");

    let perimeter = length_m(&holed);
    let expected = length_m(&outer_only) + length_m(&inner_only);
    assert!(close_to(perimeter, expected, 1e-9), "perimeter was {perimeter}");
    assert!(close_to(perimeter, 3.0 * 443.8, 0.01), "perimeter was {perimeter}");
}

#[test]
fn meridian_degree_length() {
    let line = Geometry::LineString(LineString::from(vec![(0.0, 0.0), (0.0, 1.0)]));
    let length = length_m(&line);
    assert!(close_to(length, 110_574.0, 0.001), "length was {length}");
    assert!(area_m2(&line).abs() < f64::EPSILON);
}

#[test]
fn polygon_length_is_perimeter() {
    let perimeter = length_m(&square(0.001));
    assert!(close_to(perimeter, 443.8, 0.01), "perimeter was {perimeter}");
}

#[test]
fn points_have_no_measure() {
    let point = Geometry::Point(Point::new(106.8, -6.2));
    let many = Geometry::MultiPoint(MultiPoint::from(vec![(0.0, 0.0), (1.0, 1.0)]));
    for g in [point, many] {
        assert!(area_m2(&g).abs() < f64::EPSILON);
        assert!(length_m(&g).abs() < f64::EPSILON);
    }
}

#[test]
fn format_area_units() {
    assert_eq!(format_area(12.5), "12.50 m²");
    assert_eq!(format_area(12_309.0), "12309.00 m² (1.23 ha)");
    assert_eq!(format_area(2_500_000.0), "2.50 km² (250.00 ha)");
}

#[test]
fn format_length_units() {
    assert_eq!(format_length(999.994), "999.99 m");
    assert_eq!(format_length(110_574.0), "110.57 km");
}

#[test]
fn measurement_display_by_kind() {
    let shape = Shape::new(1, square(0.001), None).unwrap();
    let text = Measurement::of(&shape).to_string();
    assert!(text.starts_with("polygon, area "), "{text}");
    assert!(text.contains("perimeter"), "{text}");

    let point = Shape::new(2, Geometry::Point(Point::new(0.0, 0.0)), None).unwrap();
    assert_eq!(Measurement::of(&point).to_string(), "point");
}
