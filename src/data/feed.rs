//! GeoJSON parsing for the three input datasets
//!
//! The quake feed is the USGS-style GeoJSON summary feed: point features
//! whose properties carry `mag`, `time` and `title`/`place`, with the
//! event depth (km) as the third coordinate. The city dataset is point
//! features with `name`, `country` and `population` (millions); the
//! boundary dataset is Polygon/MultiPolygon features with a `name`.
//!
//! A feature with missing or malformed geometry or numbers is skipped
//! with a warning; only a top-level parse failure is an error.

use chrono::{DateTime, Utc};
use geo::Point;
use geojson::{FeatureCollection, GeoJson, Value};
use serde_json::Map;

use crate::data::{
    AgeCategory, City, Country, CountryBoundaries, DataError, DisplayFlags, Earthquake, Result,
};

/// Read a property as a float, accepting both JSON numbers and numeric
/// strings (some city datasets store populations as strings).
fn prop_f64(properties: &Map<String, serde_json::Value>, key: &str) -> Option<f64> {
    match properties.get(key)? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn prop_str<'a>(properties: &'a Map<String, serde_json::Value>, key: &str) -> Option<&'a str> {
    properties.get(key)?.as_str()
}

fn prop_i64(properties: &Map<String, serde_json::Value>, key: &str) -> Option<i64> {
    properties.get(key)?.as_i64()
}

fn feature_collection(geojson_str: &str) -> Result<FeatureCollection> {
    let geojson: GeoJson = geojson_str.parse()?;
    Ok(FeatureCollection::try_from(geojson)?)
}

/// Parse a USGS-style GeoJSON quake feed.
///
/// `now` anchors the age-category derivation so callers (and tests) can
/// pin it; the app passes `Utc::now()` at load time.
pub fn parse_quakes(geojson_str: &str, now: DateTime<Utc>) -> Result<Vec<Earthquake>> {
    let collection = feature_collection(geojson_str)?;

    let mut quakes = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let Some(geometry) = feature.geometry else {
            tracing::warn!("Skipping quake feature without geometry");
            continue;
        };
        let Value::Point(coords) = geometry.value else {
            tracing::warn!("Skipping quake feature with non-point geometry");
            continue;
        };
        if coords.len() < 2 {
            tracing::warn!("Skipping quake feature with short coordinate array");
            continue;
        }
        let location = Point::new(coords[0], coords[1]);
        // USGS encodes the hypocenter depth (km) as the third coordinate
        let depth_km = coords.get(2).copied().unwrap_or(0.0);

        let properties = feature.properties.unwrap_or_default();
        let Some(magnitude) = prop_f64(&properties, "mag") else {
            tracing::warn!("Skipping quake feature with missing or malformed magnitude");
            continue;
        };

        let time_ms = prop_i64(&properties, "time");
        let age = match time_ms {
            Some(ms) => AgeCategory::from_event_time(ms, now),
            None => AgeCategory::Older,
        };

        let title = prop_str(&properties, "title")
            .map(str::to_owned)
            .or_else(|| {
                prop_str(&properties, "place")
                    .map(|place| format!("M {magnitude:.1} - {place}"))
            })
            .unwrap_or_else(|| format!("M {magnitude:.1}"));

        quakes.push(Earthquake {
            location,
            magnitude,
            depth_km,
            time_ms,
            age,
            title,
            country: None,
            on_land: false,
            flags: DisplayFlags::default(),
        });
    }

    tracing::info!("Parsed {} earthquakes from feed", quakes.len());
    Ok(quakes)
}

/// Parse the city dataset.
pub fn parse_cities(geojson_str: &str) -> Result<Vec<City>> {
    let collection = feature_collection(geojson_str)?;

    let mut cities = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let Some(geometry) = feature.geometry else {
            tracing::warn!("Skipping city feature without geometry");
            continue;
        };
        let Value::Point(coords) = geometry.value else {
            tracing::warn!("Skipping city feature with non-point geometry");
            continue;
        };
        if coords.len() < 2 {
            tracing::warn!("Skipping city feature with short coordinate array");
            continue;
        }

        let properties = feature.properties.unwrap_or_default();
        let (Some(name), Some(country)) = (
            prop_str(&properties, "name"),
            prop_str(&properties, "country"),
        ) else {
            tracing::warn!("Skipping city feature without name/country");
            continue;
        };
        let Some(population) = prop_f64(&properties, "population") else {
            tracing::warn!(city = name, "Skipping city with malformed population");
            continue;
        };

        cities.push(City {
            location: Point::new(coords[0], coords[1]),
            name: name.to_owned(),
            country: country.to_owned(),
            population,
            flags: DisplayFlags::default(),
        });
    }

    tracing::info!("Parsed {} cities", cities.len());
    Ok(cities)
}

/// Parse the country boundary dataset.
///
/// Polygon features are normalized to one-element multipolygons so the
/// classifier only deals with one shape kind.
pub fn parse_boundaries(geojson_str: &str) -> Result<CountryBoundaries> {
    let collection = feature_collection(geojson_str)?;

    let mut countries = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let properties = feature.properties.unwrap_or_default();
        let Some(name) = prop_str(&properties, "name").or_else(|| prop_str(&properties, "ADMIN"))
        else {
            tracing::warn!("Skipping country feature without a name");
            continue;
        };

        let Some(geometry) = feature.geometry else {
            tracing::warn!(country = name, "Skipping country feature without geometry");
            continue;
        };
        let converted = match geometry.value {
            value @ Value::Polygon(_) => {
                geo::Polygon::<f64>::try_from(value).map(|polygon| geo::MultiPolygon(vec![polygon]))
            }
            value @ Value::MultiPolygon(_) => geo::MultiPolygon::<f64>::try_from(value),
            _ => {
                tracing::warn!(country = name, "Skipping country with non-polygon geometry");
                continue;
            }
        };
        match converted {
            Ok(geometry) => countries.push(Country {
                name: name.to_owned(),
                geometry,
            }),
            Err(error) => {
                tracing::warn!(country = name, %error, "Skipping country with invalid outline");
            }
        }
    }

    if countries.is_empty() {
        return Err(DataError::EmptyDataset("country boundaries"));
    }

    tracing::info!("Parsed {} country outlines", countries.len());
    Ok(CountryBoundaries::new(countries))
}

#[cfg(test)]
pub(crate) const QUAKE_FEED: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {
                    "mag": 5.2,
                    "time": 1767175200000,
                    "title": "M 5.2 - 96 km SSE of Lata, Solomon Islands"
                },
                "geometry": {"type": "Point", "coordinates": [166.3, -11.5, 35.0]}
            },
            {
                "type": "Feature",
                "properties": {"mag": 2.8, "place": "offshore Northern California"},
                "geometry": {"type": "Point", "coordinates": [-124.6, 40.4]}
            },
            {
                "type": "Feature",
                "properties": {"mag": null, "title": "broken event"},
                "geometry": {"type": "Point", "coordinates": [0.0, 0.0, 10.0]}
            }
        ]
    }"#;

#[cfg(test)]
pub(crate) const CITY_DATA: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"name": "Taipei", "country": "Taiwan", "population": 2.635},
                "geometry": {"type": "Point", "coordinates": [121.45, 25.03]}
            },
            {
                "type": "Feature",
                "properties": {"name": "Lima", "country": "Peru", "population": "9.13"},
                "geometry": {"type": "Point", "coordinates": [-77.05, -12.07]}
            },
            {
                "type": "Feature",
                "properties": {"name": "Nowhere", "country": "Atlantis", "population": "lost"},
                "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}
            }
        ]
    }"#;

#[cfg(test)]
pub(crate) const COUNTRY_DATA: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"name": "Westland"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"name": "Eastland"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[20,0],[30,0],[30,10],[20,10],[20,0]]],
                        [[[35,0],[37,0],[37,2],[35,2],[35,0]]]
                    ]
                }
            }
        ]
    }"#;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reference_now() -> DateTime<Utc> {
        // A few hours after the fixture's event time
        Utc.timestamp_millis_opt(1767175200000 + 3 * 3600 * 1000)
            .unwrap()
    }

    #[test]
    fn test_parse_quakes_reads_depth_from_third_coordinate() {
        let quakes = parse_quakes(QUAKE_FEED, reference_now()).unwrap();
        assert_eq!(quakes.len(), 2, "malformed event must be skipped");

        let lata = &quakes[0];
        assert!((lata.magnitude - 5.2).abs() < 1e-9);
        assert!((lata.depth_km - 35.0).abs() < 1e-9);
        assert_eq!(lata.age, AgeCategory::PastDay);
        assert_eq!(lata.title, "M 5.2 - 96 km SSE of Lata, Solomon Islands");
        assert!(lata.country.is_none());
        assert!(!lata.on_land);
    }

    #[test]
    fn test_parse_quakes_builds_title_from_place() {
        let quakes = parse_quakes(QUAKE_FEED, reference_now()).unwrap();
        let offshore = &quakes[1];
        assert_eq!(offshore.title, "M 2.8 - offshore Northern California");
        // No time property: age falls back to Older, depth to 0
        assert_eq!(offshore.age, AgeCategory::Older);
        assert!((offshore.depth_km - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_quakes_rejects_garbage() {
        assert!(parse_quakes("not json", reference_now()).is_err());
    }

    #[test]
    fn test_parse_cities_accepts_numeric_strings() {
        let cities = parse_cities(CITY_DATA).unwrap();
        assert_eq!(cities.len(), 2, "city with unparseable population skipped");
        assert_eq!(cities[0].name, "Taipei");
        assert!((cities[1].population - 9.13).abs() < 1e-9);
    }

    #[test]
    fn test_parse_boundaries_normalizes_polygons() {
        let boundaries = parse_boundaries(COUNTRY_DATA).unwrap();
        assert_eq!(boundaries.len(), 2);

        assert_eq!(
            boundaries.locate(geo::Point::new(5.0, 5.0)),
            Some("Westland")
        );
        assert_eq!(
            boundaries.locate(geo::Point::new(36.0, 1.0)),
            Some("Eastland")
        );
        assert_eq!(boundaries.locate(geo::Point::new(15.0, 5.0)), None);
    }

    #[test]
    fn test_parse_boundaries_with_no_usable_features_is_an_error() {
        let empty = r#"{"type": "FeatureCollection", "features": []}"#;
        assert!(matches!(
            parse_boundaries(empty),
            Err(DataError::EmptyDataset(_))
        ));
    }
}
