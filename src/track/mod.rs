//! Flight tracks: parsed records, path length, and the in-memory registry.

pub mod distance;
pub mod registry;

use chrono::{DateTime, NaiveTime, Utc};
use geo::{Distance, Haversine};
use serde::Serialize;

pub use distance::total_distance;
pub use registry::{RegistryError, TrackField, TrackRegistry, TrackSummary};

/// Single GNSS fix along a flight path (IGC B record).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub time: NaiveTime,
    pub latitude: f64,
    pub longitude: f64,
    pub pressure_altitude: i32,
    pub gnss_altitude: i32,
    /// `A` (3D fix) in the source record; `V` marks a 2D or missing fix.
    pub valid: bool,
}

impl Point {
    /// Bare position with no time or altitude; mostly useful for building paths by hand.
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Point {
            time: NaiveTime::MIN,
            latitude,
            longitude,
            pressure_altitude: 0,
            gnss_altitude: 0,
            valid: true,
        }
    }

    /// Great-circle distance to `other` in kilometres.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let from = geo::Point::new(self.longitude, self.latitude);
        let to = geo::Point::new(other.longitude, other.latitude);
        Haversine.distance(from, to) / 1000.0
    }
}

/// A registered flight. Never mutated once it enters the registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    /// Content-derived identifier (logger unique id from the A record).
    pub id: String,
    pub pilot: String,
    pub glider_type: String,
    pub glider_id: String,
    /// Flight date from the header, at midnight UTC.
    pub recorded_at: DateTime<Utc>,
    pub points: Vec<Point>,
}

impl Track {
    /// Total path length in kilometres.
    pub fn length_km(&self) -> f64 {
        total_distance(&self.points)
    }
}
