use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A geographic point in degrees latitude/longitude.
///
/// Equality and hashing compare the exact bit patterns of both fields. Two
/// coordinates that differ by a single ULP are different points; this is what
/// lets callers detect literal duplicate points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(rename = "lat")]
    pub latitude_deg: f64,
    #[serde(rename = "long")]
    pub longitude_deg: f64,
}

impl Coordinate {
    pub const ZERO: Coordinate = Coordinate {
        latitude_deg: 0.0,
        longitude_deg: 0.0,
    };

    #[must_use]
    pub const fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
        }
    }

    #[must_use]
    pub fn latitude_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    #[must_use]
    pub fn longitude_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.latitude_deg.to_bits() == other.latitude_deg.to_bits()
            && self.longitude_deg.to_bits() == other.longitude_deg.to_bits()
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.latitude_deg.to_bits().hash(state);
        self.longitude_deg.to_bits().hash(state);
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "lat={}, long={}", self.latitude_deg, self.longitude_deg)
    }
}
