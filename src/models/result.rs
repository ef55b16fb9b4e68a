//! Per-query result records.
//!
//! These are plain values constructed fresh for each query. Wire formats are
//! defined by the surfaces that return them (see the `query` binary).

use super::{CountryId, CountryMetadata, GeoPoint};
use crate::pip::ConfidenceBand;

/// Outcome of a forward (coordinate → country) resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionResult {
    /// `None` when no country encloses the point (typically ocean)
    pub country_id: Option<CountryId>,
    pub name: Option<String>,
    pub iso2: Option<String>,
    pub iso3: Option<String>,
    pub continent: Option<String>,
    pub timezone: Option<String>,
    /// Heuristic score in [0, 1]; exactly 0.0 for no match
    pub confidence: f64,
}

impl ResolutionResult {
    /// A valid point that lies in no country.
    pub fn no_match() -> Self {
        Self {
            country_id: None,
            name: None,
            iso2: None,
            iso3: None,
            continent: None,
            timezone: None,
            confidence: 0.0,
        }
    }

    pub fn matched(country_id: CountryId, meta: &CountryMetadata, confidence: f64) -> Self {
        Self {
            country_id: Some(country_id),
            name: Some(meta.name.clone()),
            iso2: meta.iso2.clone(),
            iso3: meta.iso3.clone(),
            continent: meta.continent.clone(),
            timezone: meta.timezone.clone(),
            confidence,
        }
    }

    pub fn is_match(&self) -> bool {
        self.country_id.is_some()
    }

    pub fn band(&self) -> Option<ConfidenceBand> {
        self.country_id
            .map(|_| ConfidenceBand::from_score(self.confidence))
    }
}

/// Outcome of a reverse (identifier → coordinate) resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseResolutionResult {
    pub country_id: CountryId,
    /// Representative coordinate (mean of per-exterior centroids)
    pub point: GeoPoint,
    pub name: String,
    pub iso2: Option<String>,
    pub iso3: Option<String>,
    pub continent: Option<String>,
    pub timezone: Option<String>,
    /// Always 1.0: the identifier matched metadata exactly
    pub confidence: f64,
}

impl ReverseResolutionResult {
    pub fn new(country_id: CountryId, point: GeoPoint, meta: &CountryMetadata) -> Self {
        Self {
            country_id,
            point,
            name: meta.name.clone(),
            iso2: meta.iso2.clone(),
            iso3: meta.iso3.clone(),
            continent: meta.continent.clone(),
            timezone: meta.timezone.clone(),
            confidence: 1.0,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.point.lat
    }

    pub fn longitude(&self) -> f64 {
        self.point.lon
    }
}
