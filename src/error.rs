//! Error types for country resolution.

use thiserror::Error;

use crate::models::CountryId;

/// The error type for all library operations.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Latitude outside [-90, 90].
    #[error("Invalid latitude: {0} (must be between -90 and 90)")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180].
    #[error("Invalid longitude: {0} (must be between -180 and 180)")]
    InvalidLongitude(f64),

    /// Geohash precision outside 1..=12.
    #[error("Invalid geohash precision: {0} (must be between 1 and 12)")]
    InvalidPrecision(usize),

    /// Empty geohash, or one containing characters outside the base-32 alphabet.
    #[error("Invalid geohash: '{0}'")]
    InvalidGeohash(String),

    /// A caller-supplied option could not be interpreted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Reverse lookup found no country matching the identifier.
    #[error("No country matches '{0}'")]
    NotFound(String),

    /// The store references a country id with no backing record.
    #[error("Data consistency error: country {country_id} has no {missing} record")]
    DataConsistency {
        country_id: CountryId,
        missing: &'static str,
    },

    /// I/O failure while loading data files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A data file could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GeoError {
    /// True for errors caused by the caller's input rather than the data.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            GeoError::InvalidLatitude(_)
                | GeoError::InvalidLongitude(_)
                | GeoError::InvalidPrecision(_)
                | GeoError::InvalidGeohash(_)
                | GeoError::InvalidArgument(_)
        )
    }

    pub(crate) fn missing_polygon(country_id: CountryId) -> Self {
        GeoError::DataConsistency {
            country_id,
            missing: "polygon",
        }
    }

    pub(crate) fn missing_metadata(country_id: CountryId) -> Self {
        GeoError::DataConsistency {
            country_id,
            missing: "metadata",
        }
    }
}

/// Convenience alias using [`GeoError`].
pub type Result<T> = std::result::Result<T, GeoError>;
