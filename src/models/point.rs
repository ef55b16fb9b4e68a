//! Geographic point type.

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::error::{GeoError, Result};

/// Valid latitude range
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Geographic point (lat/lon) in degrees.
///
/// Geometry throughout the crate uses `geo` coordinates with `x = lon` and
/// `y = lat`; [`GeoPoint::to_coord`] performs that mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Creates a validated point.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        validate(lat, lon)?;
        Ok(Self { lat, lon })
    }

    /// Creates a point without range checks. Use with trusted inputs only.
    #[inline]
    pub const fn new_unchecked(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    #[inline]
    pub fn to_coord(self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

impl From<Coord<f64>> for GeoPoint {
    fn from(c: Coord<f64>) -> Self {
        Self { lat: c.y, lon: c.x }
    }
}

/// Checks that a coordinate pair lies within geographic bounds.
///
/// NaN fails both checks.
pub fn validate(lat: f64, lon: f64) -> Result<()> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(GeoError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(GeoError::InvalidLongitude(lon));
    }
    Ok(())
}
