//! Earthquake Marker Data Module
//!
//! This module holds everything with algorithmic content: marker records,
//! the geometric core (point-in-polygon containment, haversine distances,
//! threat radii), country boundary lookup, GeoJSON feed parsing, the
//! marker catalog, and the selection/visibility state machine. Nothing in
//! here touches the UI, so all of it is unit-tested directly.
//!
//! # Architecture
//!
//! - **[`City`] / [`Earthquake`]**: flat value records built from feed data
//! - **[`CountryBoundaries`]**: country multipolygons for membership tests
//! - **[`MarkerCatalog`]**: owns all markers, runs land/country
//!   classification, exposes aggregate statistics
//! - **[`Selection`]**: the hover + drill-down state machine
//!
//! # Usage Example
//!
//! ```rust
//! use quake_map_viewer::data::{feed, MarkerCatalog};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut catalog = MarkerCatalog::new();
//! # /*
//! let countries = std::fs::read_to_string("data/countries.geo.json")?;
//! catalog.set_boundaries(feed::parse_boundaries(&countries)?);
//!
//! let quakes = std::fs::read_to_string("data/quakes.geojson")?;
//! catalog.set_quakes(feed::parse_quakes(&quakes, chrono::Utc::now())?);
//!
//! for (country, count) in catalog.quakes_by_country() {
//!     println!("{country} : {count}");
//! }
//! # */
//! # Ok(())
//! # }
//! ```

mod boundaries;
mod catalog;
mod city;
pub mod feed;
pub mod geometry;
mod quake;
mod selection;

// Public API exports
pub use boundaries::{Country, CountryBoundaries};
pub use catalog::{CatalogInfo, MarkerCatalog};
pub use city::City;
pub use quake::{AgeCategory, DepthBand, DisplayFlags, Earthquake, threat_circle_km};
pub use selection::{MarkerRef, Selection};

/// Error types for the data module
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("GeoJSON parsing error: {0}")]
    Geojson(#[from] geojson::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Empty dataset: {0}")]
    EmptyDataset(&'static str),
}

pub type Result<T> = std::result::Result<T, DataError>;
