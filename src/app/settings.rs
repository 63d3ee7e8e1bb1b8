use clap::Parser;
use std::path::PathBuf;

/// USGS GeoJSON summary feed: all M2.5+ quakes of the past week
pub const DEFAULT_QUAKE_FEED: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/2.5_week.geojson";

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Quake Map Viewer - Interactive map of recent earthquakes and the cities they threaten
pub struct Settings {
    /// Earthquake feed: an http(s) URL or a local GeoJSON file
    #[clap(short, long, value_name = "URL_OR_FILE", default_value = DEFAULT_QUAKE_FEED)]
    pub quakes: String,

    /// City dataset (GeoJSON point features with name, country, population)
    #[clap(long, value_name = "FILE", default_value = "data/city-data.geo.json")]
    pub cities: PathBuf,

    /// Country boundary dataset (GeoJSON Polygon/MultiPolygon features)
    #[clap(long, value_name = "FILE", default_value = "data/countries.geo.json")]
    pub countries: PathBuf,

    /// Marker size multiplier
    #[clap(long, default_value = "1.0")]
    pub marker_scale: f32,

    /// Draw the threat circle around a drilled-down earthquake
    #[clap(long, default_value = "true")]
    pub show_threat_circle: bool,

    /// Ignore previously persisted state and start fresh
    #[clap(long, default_value = "false")]
    pub ignore_persisted: bool,
}

impl Settings {
    /// Parse settings from the command line
    pub fn from_cli() -> Self {
        Settings::parse()
    }
}
