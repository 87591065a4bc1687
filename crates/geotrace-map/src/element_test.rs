use geotrace_core::{GeoLocation, StringSubject, KEY_CITY, KEY_COUNTRY};

use super::*;

/// Places longitude on x and latitude on y, one pixel per degree.
struct GridProjection {
    width: i32,
    height: i32,
}

impl ViewProjection for GridProjection {
    #[allow(clippy::cast_possible_truncation)]
    fn project(&self, coordinate: &Coordinate) -> ScreenPoint {
        ScreenPoint::new(
            coordinate.longitude_deg.round() as i32,
            coordinate.latitude_deg.round() as i32,
        )
    }

    fn width_in_pixels(&self) -> i32 {
        self.width
    }

    fn height_in_pixels(&self) -> i32 {
        self.height
    }
}

/// Invalidates the point being computed in the middle of the computation.
struct RacingProjection<'a> {
    victim: &'a MapPoint,
}

impl ViewProjection for RacingProjection<'_> {
    fn project(&self, _coordinate: &Coordinate) -> ScreenPoint {
        self.victim.invalidate();
        ScreenPoint::new(1, 1)
    }

    fn width_in_pixels(&self) -> i32 {
        100
    }

    fn height_in_pixels(&self) -> i32 {
        100
    }
}

fn grid() -> GridProjection {
    GridProjection {
        width: 100,
        height: 50,
    }
}

fn point(x: f64, y: f64) -> MapPoint {
    MapPoint::new("p", Coordinate::new(y, x), Rgb::RED)
}

#[test]
fn point_starts_invalid_and_caches_after_calculation() {
    let p = point(10.0, 20.0);
    assert!(!p.is_valid());
    p.calculate_coordinates(&grid());
    assert!(p.is_valid());
    assert_eq!(p.screen_point(), ScreenPoint::new(10, 20));
    p.invalidate();
    assert!(!p.is_valid());
}

#[test]
fn negative_screen_points_survive_packing() {
    let p = point(-7.0, -3.0);
    p.calculate_coordinates(&grid());
    assert_eq!(p.screen_point(), ScreenPoint::new(-7, -3));
}

#[test]
fn invalidation_during_calculation_keeps_element_invalid() {
    let p = point(0.0, 0.0);
    p.calculate_coordinates(&RacingProjection { victim: &p });
    assert!(!p.is_valid());
    p.calculate_coordinates(&grid());
    assert!(p.is_valid());
}

#[test]
fn point_visibility_is_half_open() {
    let projection = grid();
    for (x, y, visible) in [
        (0.0, 0.0, true),
        (99.0, 49.0, true),
        (100.0, 10.0, false),
        (10.0, 50.0, false),
        (-1.0, 10.0, false),
    ] {
        let p = point(x, y);
        p.calculate_coordinates(&projection);
        assert_eq!(p.is_visible(&projection), visible, "({x}, {y})");
    }
}

#[test]
fn line_crossing_viewport_is_visible_even_with_both_ends_outside() {
    let projection = grid();
    let line = MapLine::new(point(-20.0, 10.0), point(150.0, 30.0), Rgb::BLUE);
    line.calculate_coordinates(&projection);
    assert!(line.is_visible(&projection));

    let off_screen = MapLine::new(point(120.0, 10.0), point(150.0, 30.0), Rgb::BLUE);
    off_screen.calculate_coordinates(&projection);
    assert!(!off_screen.is_visible(&projection));
}

#[test]
fn line_distance_uses_nearer_endpoint() {
    let line = MapLine::new(point(0.0, 0.0), point(40.0, 0.0), Rgb::BLUE);
    line.calculate_coordinates(&grid());
    assert!((line.distance_squared(38, 0) - 4.0).abs() < f64::EPSILON);
    assert!((line.distance_squared(1, 0) - 1.0).abs() < f64::EPSILON);
}

#[test]
fn line_closest_returns_endpoint_within_range() {
    let mut start = point(0.0, 0.0);
    start.flags.endpoint = true;
    let line = MapElement::Line(MapLine::new(start, point(40.0, 0.0), Rgb::BLUE));
    line.calculate_coordinates(&grid());

    let hit = line.closest_element(39, 1, 9.0).unwrap();
    assert_eq!(hit.screen_point(), ScreenPoint::new(40, 0));
    let hit = line.closest_element(2, 0, 9.0).unwrap();
    assert!(hit.flags.endpoint);
    assert!(line.closest_element(20, 20, 9.0).is_none());
}

#[test]
fn point_from_invalid_location_is_rejected() {
    let subject = StringSubject::new("10.0.0.1").unwrap();
    assert!(MapPoint::from_location(&GeoLocation::invalid(subject), Rgb::RED).is_none());
}

#[test]
fn point_label_includes_place() {
    let subject = StringSubject::new("8.8.8.8").unwrap();
    let location = GeoLocation::new(subject, 37.4, -122.1)
        .set_parameter(KEY_CITY, "Mountain View")
        .set_parameter(KEY_COUNTRY, "United States");
    let p = MapPoint::from_location(&location, Rgb::RED).unwrap();
    assert_eq!(p.label(), "8.8.8.8 (Mountain View, United States)");
}

#[test]
fn cloned_point_recomputes_its_position() {
    let p = point(5.0, 5.0);
    p.calculate_coordinates(&grid());
    let copy = p.clone();
    assert!(!copy.is_valid());
}

#[test]
fn element_kind_matches_variant() {
    let line = MapLine::new(point(0.0, 0.0), point(1.0, 1.0), Rgb::BLACK);
    assert_eq!(MapElement::Point(point(0.0, 0.0)).kind(), ElementKind::Point);
    assert_eq!(MapElement::Line(line.clone()).kind(), ElementKind::Line);
    assert_eq!(MapElement::CurvedLine(line).kind(), ElementKind::CurvedLine);
}
