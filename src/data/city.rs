//! City records

use geo::Point;

use crate::data::quake::DisplayFlags;

/// A city marker built from the city dataset
#[derive(Clone, Debug)]
pub struct City {
    /// WGS84 location, x = longitude, y = latitude
    pub location: Point<f64>,
    pub name: String,
    pub country: String,
    /// Population in millions
    pub population: f64,
    pub flags: DisplayFlags,
}

impl City {
    /// Tooltip lines shown when the marker is hovered
    pub fn tooltip_lines(&self) -> [String; 2] {
        [
            format!("{} ({})", self.name, self.country),
            format!("Pop: {} Million", self.population),
        ]
    }
}

#[cfg(test)]
pub(crate) fn test_city(lon: f64, lat: f64, name: &str) -> City {
    City {
        location: Point::new(lon, lat),
        name: name.to_string(),
        country: "Testland".to_string(),
        population: 1.5,
        flags: DisplayFlags::default(),
    }
}
