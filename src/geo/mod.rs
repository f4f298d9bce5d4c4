//! Geospatial primitives: coordinates, geohash codes, great-circle distance,
//! and the radius-to-precision table used by the proximity index.

pub mod distance;
pub mod geohash;
pub mod precision;

pub use distance::distance_km;
pub use geohash::{decode, encode, Decoded};
pub use precision::precision_for;

use serde::{Deserialize, Serialize};

use crate::types::{RelayError, Result};

/// A validated latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting (never clamping) out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(RelayError::Configuration(format!(
                "latitude out of range [-90, 90]: {latitude}"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(RelayError::Configuration(format!(
                "longitude out of range [-180, 180]: {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}
