//! Earthquake records, depth banding, and the threat-circle model

use chrono::{DateTime, TimeZone, Utc};
use geo::Point;

use crate::data::geometry;

/// Conversion factor used by the threat-circle model
pub const KM_PER_MILE: f64 = 1.6;

/// Depth threshold between shallow and intermediate quakes, in km
pub const THRESHOLD_INTERMEDIATE_KM: f64 = 70.0;

/// Depth threshold between intermediate and deep quakes, in km
pub const THRESHOLD_DEEP_KM: f64 = 300.0;

/// Display state shared by every marker on the map
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayFlags {
    /// Marker is not drawn and not clickable
    pub hidden: bool,
    /// Marker is hovered; its details are shown
    pub selected: bool,
}

/// Depth band of a quake, drives the marker fill color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DepthBand {
    Shallow,
    Intermediate,
    Deep,
}

impl DepthBand {
    /// Classify a depth in km into one of the three bands.
    ///
    /// The bands partition the depth axis at 70 and 300 km; a boundary
    /// value falls into the deeper band.
    pub fn classify(depth_km: f64) -> Self {
        if depth_km < THRESHOLD_INTERMEDIATE_KM {
            Self::Shallow
        } else if depth_km < THRESHOLD_DEEP_KM {
            Self::Intermediate
        } else {
            Self::Deep
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Shallow => "Shallow",
            Self::Intermediate => "Intermediate",
            Self::Deep => "Deep",
        }
    }
}

/// How long ago a quake occurred, derived from its event timestamp
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgeCategory {
    PastHour,
    PastDay,
    PastWeek,
    Older,
}

impl AgeCategory {
    /// Derive the age category from an epoch-milliseconds event time.
    ///
    /// Event times in the future (clock skew between the feed and this
    /// machine) count as `PastHour`.
    pub fn from_event_time(time_ms: i64, now: DateTime<Utc>) -> Self {
        let Some(event) = Utc.timestamp_millis_opt(time_ms).single() else {
            return Self::Older;
        };
        let elapsed = now.signed_duration_since(event);
        if elapsed <= chrono::Duration::hours(1) {
            Self::PastHour
        } else if elapsed <= chrono::Duration::days(1) {
            Self::PastDay
        } else if elapsed <= chrono::Duration::days(7) {
            Self::PastWeek
        } else {
            Self::Older
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PastHour => "Past Hour",
            Self::PastDay => "Past Day",
            Self::PastWeek => "Past Week",
            Self::Older => "Older",
        }
    }
}

/// Distance up to which a quake of magnitude `m` can affect things, in km.
///
/// Empirical exponential model: every 0.5 increase in magnitude roughly
/// doubles the radius. `20 miles * 1.8^(2m - 5)`, converted to km.
pub fn threat_circle_km(magnitude: f64) -> f64 {
    let miles = 20.0 * 1.8_f64.powf(2.0 * magnitude - 5.0);
    miles * KM_PER_MILE
}

/// A single earthquake event built from one feed feature
#[derive(Clone, Debug)]
pub struct Earthquake {
    /// WGS84 location, x = longitude, y = latitude
    pub location: Point<f64>,
    pub magnitude: f64,
    pub depth_km: f64,
    /// Event time in epoch milliseconds, if the feed carried one
    pub time_ms: Option<i64>,
    pub age: AgeCategory,
    /// Human-readable title, e.g. "M 5.2 - 96 km SSE of Lata, Solomon Islands"
    pub title: String,
    /// Owning country, assigned by the classifier on first polygon match
    pub country: Option<String>,
    /// True iff a containing country polygon was found
    pub on_land: bool,
    pub flags: DisplayFlags,
}

impl Earthquake {
    pub fn depth_band(&self) -> DepthBand {
        DepthBand::classify(self.depth_km)
    }

    /// Threat-circle radius of this quake in km
    pub fn threat_circle_km(&self) -> f64 {
        threat_circle_km(self.magnitude)
    }

    /// On-screen marker radius in pixels, before user scaling
    pub fn marker_radius(&self) -> f32 {
        (1.75 * self.magnitude) as f32
    }

    /// Haversine distance from this quake to an arbitrary point, in km
    pub fn distance_km_to(&self, point: Point<f64>) -> f64 {
        geometry::haversine_km(self.location, point)
    }

    /// Whether the quake is recent enough to get the X overlay
    pub fn within_past_day(&self) -> bool {
        matches!(self.age, AgeCategory::PastHour | AgeCategory::PastDay)
    }
}

#[cfg(test)]
pub(crate) fn test_quake(lon: f64, lat: f64, magnitude: f64, depth_km: f64) -> Earthquake {
    Earthquake {
        location: Point::new(lon, lat),
        magnitude,
        depth_km,
        time_ms: None,
        age: AgeCategory::Older,
        title: format!("M {magnitude:.1} - test event"),
        country: None,
        on_land: false,
        flags: DisplayFlags::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_banding_partitions_at_70_and_300() {
        assert_eq!(DepthBand::classify(0.0), DepthBand::Shallow);
        assert_eq!(DepthBand::classify(69.9), DepthBand::Shallow);
        assert_eq!(DepthBand::classify(70.0), DepthBand::Intermediate);
        assert_eq!(DepthBand::classify(299.9), DepthBand::Intermediate);
        assert_eq!(DepthBand::classify(300.0), DepthBand::Deep);
        assert_eq!(DepthBand::classify(700.0), DepthBand::Deep);
    }

    #[test]
    fn test_threat_circle_known_values() {
        // m = 2.5 puts the exponent at zero: exactly 20 miles = 32 km
        assert!((threat_circle_km(2.5) - 32.0).abs() < 1e-9);
        // m = 5.0: 20 * 1.8^5 miles = 604.66176 km
        assert!((threat_circle_km(5.0) - 604.66176).abs() < 1e-6);
    }

    #[test]
    fn test_threat_circle_monotonic_in_magnitude() {
        let mut previous = 0.0;
        for step in 0..=90 {
            let magnitude = step as f64 * 0.1;
            let radius = threat_circle_km(magnitude);
            assert!(radius > previous, "radius must grow with magnitude");
            previous = radius;
        }
    }

    #[test]
    fn test_half_magnitude_step_roughly_doubles_radius() {
        let ratio = threat_circle_km(5.5) / threat_circle_km(5.0);
        assert!((ratio - 1.8_f64).abs() < 1e-9);
    }

    #[test]
    fn test_age_category_from_event_time() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let at = |h: i64| (now - chrono::Duration::hours(h)).timestamp_millis();

        assert_eq!(AgeCategory::from_event_time(at(0), now), AgeCategory::PastHour);
        assert_eq!(AgeCategory::from_event_time(at(2), now), AgeCategory::PastDay);
        assert_eq!(AgeCategory::from_event_time(at(30), now), AgeCategory::PastWeek);
        assert_eq!(
            AgeCategory::from_event_time(at(24 * 8), now),
            AgeCategory::Older
        );
        // Future event times (feed clock ahead of ours) count as PastHour
        assert_eq!(
            AgeCategory::from_event_time(at(-1), now),
            AgeCategory::PastHour
        );
    }

    #[test]
    fn test_within_past_day() {
        let mut quake = test_quake(0.0, 0.0, 5.0, 10.0);
        for (age, expected) in [
            (AgeCategory::PastHour, true),
            (AgeCategory::PastDay, true),
            (AgeCategory::PastWeek, false),
            (AgeCategory::Older, false),
        ] {
            quake.age = age;
            assert_eq!(quake.within_past_day(), expected);
        }
    }
}
