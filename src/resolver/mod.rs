//! Country resolution service.
//!
//! The forward pipeline maps a coordinate to the enclosing country; the
//! reverse pipeline maps a name or ISO code to a representative coordinate.
//! A [`Resolver`] borrows an immutable [`CountryData`] and holds no other
//! state, so it is cheap to construct per request.

pub mod candidates;
mod forward;
mod reverse;

use serde::Deserialize;

use crate::error::{GeoError, Result};
use crate::models::{
    CountryId, CountryMetadata, CountryPolygon, ResolutionResult, ReverseResolutionResult,
};
use crate::store::{CountryData, CountryStore};

pub use candidates::CandidateStage;
pub use reverse::{normalize_code, normalize_name, MatchTier};

/// Tuning for the forward pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Scan every country when no indexed candidate contains the point
    pub exhaustive_fallback: bool,
    /// Multiplier applied to confidence of matches found by that scan
    pub fallback_discount: f64,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            exhaustive_fallback: true,
            fallback_discount: 0.95,
        }
    }
}

impl ResolverOptions {
    /// Reject a `fallback_discount` outside (0, 1].
    pub fn validate(&self) -> Result<()> {
        let discount = self.fallback_discount;
        if !(discount > 0.0 && discount <= 1.0) {
            return Err(GeoError::InvalidArgument(format!(
                "fallback_discount must be in (0, 1], got {}",
                discount
            )));
        }
        Ok(())
    }
}

/// A resolution request in either direction.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Coordinates { lat: f64, lon: f64 },
    Country(String),
}

impl Query {
    /// Interpret free text: "lat,lon" becomes coordinates, anything else an identifier.
    pub fn parse(input: &str) -> Self {
        let mut parts = input.split(',').map(str::trim);
        if let (Some(a), Some(b), None) = (parts.next(), parts.next(), parts.next()) {
            if let (Ok(lat), Ok(lon)) = (a.parse::<f64>(), b.parse::<f64>()) {
                return Query::Coordinates { lat, lon };
            }
        }
        Query::Country(input.trim().to_string())
    }
}

/// Result of [`Resolver::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Forward(ResolutionResult),
    Reverse(ReverseResolutionResult),
}

/// Resolves coordinates and country identifiers against a data store.
pub struct Resolver<'a, D: CountryData + ?Sized = CountryStore> {
    store: &'a D,
    options: ResolverOptions,
}

impl<'a, D: CountryData + ?Sized> Resolver<'a, D> {
    pub fn new(store: &'a D) -> Self {
        Self::with_options(store, ResolverOptions::default())
    }

    pub fn with_options(store: &'a D, options: ResolverOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &'a D {
        self.store
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    pub fn resolve(&self, query: &Query) -> Result<Resolution> {
        match query {
            Query::Coordinates { lat, lon } => self
                .resolve_coordinates(*lat, *lon)
                .map(Resolution::Forward),
            Query::Country(identifier) => self.resolve_country(identifier).map(Resolution::Reverse),
        }
    }

    pub(crate) fn polygon_of(&self, id: CountryId) -> Result<&'a CountryPolygon> {
        self.store
            .polygon(id)
            .ok_or_else(|| GeoError::missing_polygon(id))
    }

    pub(crate) fn metadata_of(&self, id: CountryId) -> Result<&'a CountryMetadata> {
        self.store
            .metadata(id)
            .ok_or_else(|| GeoError::missing_metadata(id))
    }
}
