//! Country identifier → representative coordinate.

use geo::Coord;
use tracing::debug;

use super::Resolver;
use crate::error::{GeoError, Result};
use crate::models::{CountryId, CountryMetadata, CountryPolygon, GeoPoint, ReverseResolutionResult};
use crate::pip::geometry;
use crate::store::CountryData;

/// How an identifier matched a country record, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatchTier {
    Iso2,
    Iso3,
    Name,
    /// One of the normalized name and identifier contains the other
    Partial,
}

impl MatchTier {
    pub const ALL: [MatchTier; 4] = [
        MatchTier::Iso2,
        MatchTier::Iso3,
        MatchTier::Name,
        MatchTier::Partial,
    ];
}

/// Normalize an ISO code for comparison.
pub fn normalize_code(s: &str) -> String {
    s.trim().to_uppercase()
}

/// Normalize a country name for comparison.
///
/// Lowercases, treats `_` and `-` as spaces, and collapses whitespace.
pub fn normalize_name(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

struct Needle {
    code: String,
    name: String,
}

impl Needle {
    fn matches(&self, tier: MatchTier, meta: &CountryMetadata) -> bool {
        match tier {
            MatchTier::Iso2 => meta
                .iso2
                .as_deref()
                .is_some_and(|iso| normalize_code(iso) == self.code),
            MatchTier::Iso3 => meta
                .iso3
                .as_deref()
                .is_some_and(|iso| normalize_code(iso) == self.code),
            MatchTier::Name => normalize_name(&meta.name) == self.name,
            MatchTier::Partial => {
                let name = normalize_name(&meta.name);
                !name.is_empty() && (self.name.contains(&name) || name.contains(&self.name))
            }
        }
    }
}

impl<'a, D: CountryData + ?Sized> Resolver<'a, D> {
    /// Resolve a name, ISO alpha-2 or alpha-3 code to the country's
    /// representative coordinate.
    ///
    /// Multi-exterior countries use the mean of their exterior centroids.
    pub fn resolve_country(&self, identifier: &str) -> Result<ReverseResolutionResult> {
        let (id, tier) = self
            .find_country(identifier)
            .ok_or_else(|| GeoError::NotFound(identifier.trim().to_string()))?;
        debug!("'{}' matched country {} by {:?}", identifier, id, tier);

        let meta = self.metadata_of(id)?;
        let polygon = self.polygon_of(id)?;
        let point = representative_point(polygon).ok_or_else(|| GeoError::missing_polygon(id))?;

        Ok(ReverseResolutionResult::new(id, GeoPoint::from(point), meta))
    }

    /// Find the country an identifier refers to.
    ///
    /// Each tier is tried against every record before the next tier, so an
    /// exact match always beats a partial one. Within a tier the lowest id wins.
    pub fn find_country(&self, identifier: &str) -> Option<(CountryId, MatchTier)> {
        let needle = Needle {
            code: normalize_code(identifier),
            name: normalize_name(identifier),
        };
        if needle.name.is_empty() {
            return None;
        }

        let ids = self.store.metadata_ids();
        MatchTier::ALL.into_iter().find_map(|tier| {
            ids.iter()
                .copied()
                .find(|&id| {
                    self.store
                        .metadata(id)
                        .is_some_and(|meta| needle.matches(tier, meta))
                })
                .map(|id| (id, tier))
        })
    }
}

/// Mean of the centroids of every exterior ring.
fn representative_point(polygon: &CountryPolygon) -> Option<Coord<f64>> {
    let centroids: Vec<_> = polygon
        .exteriors()
        .iter()
        .filter_map(geometry::centroid)
        .collect();
    geometry::mean(&centroids)
}
