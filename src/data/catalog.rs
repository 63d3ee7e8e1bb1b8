//! MarkerCatalog - Top-level owner of cities, quakes, and boundaries
//!
//! This module provides the high-level API for holding all marker data,
//! running land/country classification, and answering the aggregate
//! questions the UI asks (statistics, per-country counts, strongest
//! quakes, bounding box for fit-to-view).

use geo::{Coord, Point, Rect};
use rayon::prelude::*;
use std::collections::BTreeMap;

use crate::data::{City, CountryBoundaries, Earthquake};

/// Aggregate information about the catalog contents
#[derive(Debug, Clone, Default)]
pub struct CatalogInfo {
    pub city_count: usize,
    pub quake_count: usize,
    pub land_quakes: usize,
    pub ocean_quakes: usize,
    pub shallow: usize,
    pub intermediate: usize,
    pub deep: usize,
    /// Quakes that occurred within the past day
    pub recent: usize,
}

/// Top-level owner of all markers and the boundary set
#[derive(Clone, Debug, Default)]
pub struct MarkerCatalog {
    cities: Vec<City>,
    quakes: Vec<Earthquake>,
    boundaries: CountryBoundaries,
}

impl MarkerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the boundary set and re-classify every quake against it.
    pub fn set_boundaries(&mut self, boundaries: CountryBoundaries) {
        self.boundaries = boundaries;
        self.classify_quakes();
    }

    /// Replace the city list.
    pub fn set_cities(&mut self, cities: Vec<City>) {
        self.cities = cities;
    }

    /// Replace the quake list and classify it against the current
    /// boundaries.
    pub fn set_quakes(&mut self, quakes: Vec<Earthquake>) {
        self.quakes = quakes;
        self.classify_quakes();
    }

    /// Land/country classification: each quake is tagged with the first
    /// country whose outline contains it, or left as an ocean quake.
    ///
    /// Quakes are independent, so the pass runs data-parallel.
    fn classify_quakes(&mut self) {
        profiling::scope!("classify_quakes");

        let boundaries = &self.boundaries;
        self.quakes.par_iter_mut().for_each(|quake| {
            let country = boundaries.locate(quake.location);
            quake.on_land = country.is_some();
            quake.country = country.map(str::to_owned);
        });

        let info = self.info();
        tracing::debug!(
            land = info.land_quakes,
            ocean = info.ocean_quakes,
            countries = boundaries.len(),
            "Classified quakes against country outlines"
        );
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn quakes(&self) -> &[Earthquake] {
        &self.quakes
    }

    pub fn boundaries(&self) -> &CountryBoundaries {
        &self.boundaries
    }

    pub(crate) fn cities_mut(&mut self) -> &mut [City] {
        &mut self.cities
    }

    pub(crate) fn quakes_mut(&mut self) -> &mut [Earthquake] {
        &mut self.quakes
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty() && self.quakes.is_empty()
    }

    /// Make every marker visible again.
    pub fn unhide_all(&mut self) {
        for city in &mut self.cities {
            city.flags.hidden = false;
        }
        for quake in &mut self.quakes {
            quake.flags.hidden = false;
        }
    }

    /// Aggregate statistics over the current contents.
    pub fn info(&self) -> CatalogInfo {
        let mut info = CatalogInfo {
            city_count: self.cities.len(),
            quake_count: self.quakes.len(),
            ..Default::default()
        };
        for quake in &self.quakes {
            if quake.on_land {
                info.land_quakes += 1;
            } else {
                info.ocean_quakes += 1;
            }
            match quake.depth_band() {
                crate::data::DepthBand::Shallow => info.shallow += 1,
                crate::data::DepthBand::Intermediate => info.intermediate += 1,
                crate::data::DepthBand::Deep => info.deep += 1,
            }
            if quake.within_past_day() {
                info.recent += 1;
            }
        }
        info
    }

    /// Number of land quakes per country, most active first; countries
    /// with no quakes are omitted. Ocean quakes are counted separately in
    /// [`CatalogInfo::ocean_quakes`].
    pub fn quakes_by_country(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for quake in &self.quakes {
            if let Some(country) = quake.country.as_deref() {
                *counts.entry(country).or_default() += 1;
            }
        }
        let mut counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(name, count)| (name.to_owned(), count))
            .collect();
        // Most quakes first; the BTreeMap already ordered ties by name
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    /// The `n` strongest quakes, by descending magnitude.
    pub fn strongest(&self, n: usize) -> Vec<&Earthquake> {
        let mut quakes: Vec<&Earthquake> = self.quakes.iter().collect();
        quakes.sort_by(|a, b| {
            b.magnitude
                .partial_cmp(&a.magnitude)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        quakes.truncate(n);
        quakes
    }

    /// WGS84 bounding box spanning every city and quake, or `None` if the
    /// catalog is empty. Used to fit the map view to the data.
    pub fn bounding_box(&self) -> Option<Rect<f64>> {
        let mut points = self
            .cities
            .iter()
            .map(|city| city.location)
            .chain(self.quakes.iter().map(|quake| quake.location));

        let first: Point<f64> = points.next()?;
        let mut min = first.0;
        let mut max = first.0;
        for point in points {
            min.x = min.x.min(point.x());
            min.y = min.y.min(point.y());
            max.x = max.x.max(point.x());
            max.y = max.y.max(point.y());
        }
        Some(Rect::new(
            Coord { x: min.x, y: min.y },
            Coord { x: max.x, y: max.y },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::boundaries::test_boundaries;
    use crate::data::city::test_city;
    use crate::data::quake::test_quake;

    fn test_catalog() -> MarkerCatalog {
        let mut catalog = MarkerCatalog::new();
        catalog.set_boundaries(test_boundaries());
        catalog.set_cities(vec![
            test_city(5.0, 5.0, "Westville"),
            test_city(25.0, 5.0, "Eastburg"),
        ]);
        catalog.set_quakes(vec![
            test_quake(5.0, 5.0, 6.0, 10.0),    // in Westland, shallow
            test_quake(6.0, 6.0, 4.0, 100.0),   // in Westland, intermediate
            test_quake(36.0, 1.0, 5.0, 350.0),  // Eastland island, deep
            test_quake(-40.0, -40.0, 7.0, 30.0), // open ocean
        ]);
        catalog
    }

    #[test]
    fn test_classification_assigns_first_matching_country() {
        let catalog = test_catalog();
        let quakes = catalog.quakes();

        assert_eq!(quakes[0].country.as_deref(), Some("Westland"));
        assert!(quakes[0].on_land);
        assert_eq!(quakes[2].country.as_deref(), Some("Eastland"));
        assert!(quakes[2].on_land);
        assert_eq!(quakes[3].country, None);
        assert!(!quakes[3].on_land);
    }

    #[test]
    fn test_info_counts() {
        let info = test_catalog().info();
        assert_eq!(info.city_count, 2);
        assert_eq!(info.quake_count, 4);
        assert_eq!(info.land_quakes, 3);
        assert_eq!(info.ocean_quakes, 1);
        assert_eq!(info.shallow, 2);
        assert_eq!(info.intermediate, 1);
        assert_eq!(info.deep, 1);
    }

    #[test]
    fn test_quakes_by_country() {
        let counts = test_catalog().quakes_by_country();
        assert_eq!(
            counts,
            vec![("Westland".to_string(), 2), ("Eastland".to_string(), 1)]
        );
    }

    #[test]
    fn test_strongest_sorted_descending_and_clamped() {
        let catalog = test_catalog();

        let top = catalog.strongest(2);
        assert_eq!(top.len(), 2);
        assert!((top[0].magnitude - 7.0).abs() < 1e-9);
        assert!((top[1].magnitude - 6.0).abs() < 1e-9);

        // Asking for more than exist returns everything, still sorted
        let all = catalog.strongest(100);
        assert_eq!(all.len(), 4);
        for pair in all.windows(2) {
            assert!(pair[0].magnitude >= pair[1].magnitude);
        }
    }

    #[test]
    fn test_bounding_box_spans_all_markers() {
        let bbox = test_catalog().bounding_box().unwrap();
        assert!((bbox.min().x - -40.0).abs() < 1e-9);
        assert!((bbox.min().y - -40.0).abs() < 1e-9);
        assert!((bbox.max().x - 36.0).abs() < 1e-9);
        assert!((bbox.max().y - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_catalog_has_no_bounding_box() {
        assert!(MarkerCatalog::new().bounding_box().is_none());
    }

    #[test]
    fn test_reclassification_after_boundary_swap() {
        let mut catalog = test_catalog();
        // Dropping the boundaries turns every quake into an ocean quake
        catalog.set_boundaries(crate::data::CountryBoundaries::default());
        assert!(catalog.quakes().iter().all(|quake| !quake.on_land));
        assert!(catalog.quakes().iter().all(|quake| quake.country.is_none()));
    }
}
