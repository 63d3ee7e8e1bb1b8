//! Geometric core: containment tests and spherical distances
//!
//! All coordinates are WGS84 degrees stored as `geo` types with x =
//! longitude and y = latitude. Containment uses even-odd ray casting per
//! ring; distances use the haversine formula on a spherical Earth.

use geo::{Coord, LineString, MultiPolygon, Point, Polygon};

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Test whether a point lies inside a single ring using even-odd ray casting.
///
/// The ring may or may not repeat its first coordinate at the end; both
/// forms are handled because the wrap-around edge is walked explicitly.
#[inline]
pub fn point_in_ring(point: Coord<f64>, ring: &LineString<f64>) -> bool {
    let coords = &ring.0;
    if coords.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = coords.len() - 1;
    for i in 0..coords.len() {
        let a = coords[i];
        let b = coords[j];
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Test whether a point lies inside a polygon: inside the exterior ring
/// and outside every interior ring (hole).
#[inline]
pub fn polygon_contains(point: Coord<f64>, polygon: &Polygon<f64>) -> bool {
    if !point_in_ring(point, polygon.exterior()) {
        return false;
    }
    !polygon
        .interiors()
        .iter()
        .any(|hole| point_in_ring(point, hole))
}

/// Test whether a point lies inside any part of a multipolygon.
#[inline]
pub fn multi_polygon_contains(point: Coord<f64>, multi: &MultiPolygon<f64>) -> bool {
    multi.0.iter().any(|polygon| polygon_contains(point, polygon))
}

/// Haversine distance between two WGS84 points in kilometers.
#[inline]
pub fn haversine_km(p1: Point<f64>, p2: Point<f64>) -> f64 {
    let lat1 = p1.y().to_radians();
    let lat2 = p2.y().to_radians();
    let delta_lat = (p2.y() - p1.y()).to_radians();
    let delta_lon = (p2.x() - p1.x()).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Great-circle destination point starting at `origin`, moving
/// `distance_km` along the initial bearing `bearing_deg` (clockwise from
/// north). Used to trace threat-circle outlines on the map.
#[inline]
pub fn destination_point(origin: Point<f64>, bearing_deg: f64, distance_km: f64) -> Point<f64> {
    let lat1 = origin.y().to_radians();
    let lon1 = origin.x().to_radians();
    let bearing = bearing_deg.to_radians();
    let angular = distance_km / EARTH_RADIUS_KM;

    let lat2 =
        (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());

    // Normalize longitude to (-180, 180]
    let lon2 = (lon2.to_degrees() + 540.0) % 360.0 - 180.0;
    Point::new(lon2, lat2.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (10.0, 0.0),
                (10.0, 10.0),
                (0.0, 10.0),
                (0.0, 0.0),
            ]),
            vec![],
        )
    }

    #[test]
    fn test_point_strictly_inside_is_inside() {
        let square = unit_square();
        assert!(polygon_contains(Coord { x: 5.0, y: 5.0 }, &square));
        assert!(polygon_contains(Coord { x: 0.1, y: 9.9 }, &square));
    }

    #[test]
    fn test_point_strictly_outside_is_outside() {
        let square = unit_square();
        assert!(!polygon_contains(Coord { x: 15.0, y: 5.0 }, &square));
        assert!(!polygon_contains(Coord { x: -0.1, y: 5.0 }, &square));
        assert!(!polygon_contains(Coord { x: 5.0, y: 10.1 }, &square));
    }

    #[test]
    fn test_hole_is_excluded() {
        let with_hole = Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (10.0, 0.0),
                (10.0, 10.0),
                (0.0, 10.0),
                (0.0, 0.0),
            ]),
            vec![LineString::from(vec![
                (4.0, 4.0),
                (6.0, 4.0),
                (6.0, 6.0),
                (4.0, 6.0),
                (4.0, 4.0),
            ])],
        );
        assert!(!polygon_contains(Coord { x: 5.0, y: 5.0 }, &with_hole));
        assert!(polygon_contains(Coord { x: 2.0, y: 2.0 }, &with_hole));
    }

    #[test]
    fn test_unclosed_ring_matches_closed_ring() {
        let closed = unit_square();
        let open = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]),
            vec![],
        );
        for point in [
            Coord { x: 5.0, y: 5.0 },
            Coord { x: 11.0, y: 5.0 },
            Coord { x: 1.0, y: 9.0 },
        ] {
            assert_eq!(
                polygon_contains(point, &closed),
                polygon_contains(point, &open)
            );
        }
    }

    #[test]
    fn test_multi_polygon_checks_all_parts() {
        let far_square = Polygon::new(
            LineString::from(vec![
                (20.0, 20.0),
                (30.0, 20.0),
                (30.0, 30.0),
                (20.0, 30.0),
                (20.0, 20.0),
            ]),
            vec![],
        );
        let multi = MultiPolygon(vec![unit_square(), far_square]);
        assert!(multi_polygon_contains(Coord { x: 5.0, y: 5.0 }, &multi));
        assert!(multi_polygon_contains(Coord { x: 25.0, y: 25.0 }, &multi));
        assert!(!multi_polygon_contains(Coord { x: 15.0, y: 15.0 }, &multi));
    }

    #[test]
    fn test_haversine_known_distance() {
        // London to Paris, roughly 344 km
        let london = Point::new(-0.1278, 51.5074);
        let paris = Point::new(2.3522, 48.8566);
        let d = haversine_km(london, paris);
        assert!((d - 344.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn test_haversine_zero_for_same_point() {
        let p = Point::new(139.6917, 35.6895);
        assert!(haversine_km(p, p).abs() < 1e-9);
    }

    #[test]
    fn test_destination_point_round_trip() {
        let origin = Point::new(-0.1278, 51.5074);
        for bearing in [0.0, 45.0, 90.0, 180.0, 270.0] {
            let dest = destination_point(origin, bearing, 100.0);
            let d = haversine_km(origin, dest);
            assert!((d - 100.0).abs() < 0.1, "bearing {bearing}: got {d}");
        }
    }

    #[test]
    fn test_destination_point_wraps_longitude() {
        let near_date_line = Point::new(179.5, 0.0);
        let dest = destination_point(near_date_line, 90.0, 200.0);
        assert!(dest.x() > -180.0 && dest.x() <= 180.0);
        assert!(dest.x() < 0.0, "expected wrap past the date line");
    }
}
