//! Country boundary polygons and membership lookup
//!
//! Countries are never rendered; they exist purely for the geometric
//! question "which country, if any, contains this point?". Some countries
//! are multipolygon (mainland plus islands), so a single-polygon feature
//! is normalized into a one-element multipolygon at load time.

use geo::{MultiPolygon, Point};

use crate::data::geometry;

/// One country: a name and its (multi)polygon outline
#[derive(Clone, Debug)]
pub struct Country {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

impl Country {
    /// Whether this country's outline contains the point
    pub fn contains(&self, point: Point<f64>) -> bool {
        geometry::multi_polygon_contains(point.0, &self.geometry)
    }
}

/// The full set of country outlines used for land classification
#[derive(Clone, Debug, Default)]
pub struct CountryBoundaries {
    countries: Vec<Country>,
}

impl CountryBoundaries {
    pub fn new(countries: Vec<Country>) -> Self {
        Self { countries }
    }

    /// Find the country containing `point`, short-circuiting on the first
    /// match. Countries are assumed non-overlapping, so at most one name
    /// is ever returned for a given point.
    pub fn locate(&self, point: Point<f64>) -> Option<&str> {
        self.countries
            .iter()
            .find(|country| country.contains(point))
            .map(|country| country.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Country> {
        self.countries.iter()
    }
}

#[cfg(test)]
fn square(name: &str, x0: f64, y0: f64, size: f64) -> Country {
    use geo::{LineString, Polygon};

    let ring = LineString::from(vec![
        (x0, y0),
        (x0 + size, y0),
        (x0 + size, y0 + size),
        (x0, y0 + size),
        (x0, y0),
    ]);
    Country {
        name: name.to_string(),
        geometry: MultiPolygon(vec![Polygon::new(ring, vec![])]),
    }
}

#[cfg(test)]
pub(crate) fn test_boundaries() -> CountryBoundaries {
    // "Westland" at the origin, "Eastland" further east with a two-part
    // outline (mainland plus an island)
    let mut eastland = square("Eastland", 20.0, 0.0, 10.0);
    eastland
        .geometry
        .0
        .extend(square("island", 35.0, 0.0, 2.0).geometry.0);
    CountryBoundaries::new(vec![square("Westland", 0.0, 0.0, 10.0), eastland])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_single_polygon() {
        let boundaries = test_boundaries();
        assert_eq!(boundaries.locate(Point::new(5.0, 5.0)), Some("Westland"));
    }

    #[test]
    fn test_locate_multi_polygon_island() {
        let boundaries = test_boundaries();
        assert_eq!(boundaries.locate(Point::new(25.0, 5.0)), Some("Eastland"));
        assert_eq!(boundaries.locate(Point::new(36.0, 1.0)), Some("Eastland"));
    }

    #[test]
    fn test_locate_ocean_point_matches_nothing() {
        let boundaries = test_boundaries();
        assert_eq!(boundaries.locate(Point::new(15.0, 5.0)), None);
        assert_eq!(boundaries.locate(Point::new(-40.0, -40.0)), None);
    }
}
