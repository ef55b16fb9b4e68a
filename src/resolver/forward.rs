//! Coordinate → country.

use geo::Coord;
use hashbrown::HashSet;
use tracing::{debug, warn};

use super::{candidates, Resolver};
use crate::error::Result;
use crate::geohash;
use crate::models::{CountryId, CountryPolygon, ResolutionResult};
use crate::pip::confidence;
use crate::store::CountryData;

/// A country whose polygon contains the query point.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Hit {
    id: CountryId,
    confidence: f64,
}

impl<'a, D: CountryData + ?Sized> Resolver<'a, D> {
    /// Resolve a coordinate to the country containing it.
    ///
    /// Out-of-range coordinates are an error. A valid point inside no
    /// country yields [`ResolutionResult::no_match`].
    pub fn resolve_coordinates(&self, lat: f64, lon: f64) -> Result<ResolutionResult> {
        let hash = geohash::encode(lat, lon, self.store.precision())?;
        let point = Coord { x: lon, y: lat };

        let (stage, candidates) = candidates::gather(self.store, &hash)?;
        if candidates.is_empty() {
            debug!("No candidates for ({}, {})", lat, lon);
            return Ok(ResolutionResult::no_match());
        }

        let mut hits = self.candidate_hits(point, &candidates);
        if hits.is_empty() && self.options.exhaustive_fallback {
            hits = self.fallback_hits(point, &candidates)?;
            if !hits.is_empty() {
                debug!(
                    "Exhaustive scan found ({}, {}) outside {:?} candidates",
                    lat, lon, stage
                );
            }
        }

        let Some(best) = best_hit(&hits) else {
            debug!("({}, {}) is in no country", lat, lon);
            return Ok(ResolutionResult::no_match());
        };

        let meta = self.metadata_of(best.id)?;
        Ok(ResolutionResult::matched(best.id, meta, best.confidence))
    }

    /// PIP-test indexed candidates. Candidates without geometry are skipped.
    fn candidate_hits(&self, point: Coord<f64>, candidates: &[CountryId]) -> Vec<Hit> {
        candidates
            .iter()
            .filter_map(|&id| {
                let Some(polygon) = self.store.polygon(id) else {
                    warn!("Indexed country {} has no polygon, skipping", id);
                    return None;
                };
                hit(polygon, point, candidates.len()).map(|confidence| Hit { id, confidence })
            })
            .collect()
    }

    /// PIP-test every country the index did not propose.
    fn fallback_hits(&self, point: Coord<f64>, tested: &[CountryId]) -> Result<Vec<Hit>> {
        let tested: HashSet<CountryId> = tested.iter().copied().collect();
        let mut hits = Vec::new();
        for &id in self.store.all_country_ids() {
            if tested.contains(&id) {
                continue;
            }
            let polygon = self.polygon_of(id)?;
            if let Some(score) = hit(polygon, point, 1) {
                hits.push(Hit {
                    id,
                    confidence: confidence::discount(score, self.options.fallback_discount),
                });
            }
        }
        Ok(hits)
    }
}

/// Confidence of `point` in `polygon`, if the polygon contains it.
///
/// Scored against the first containing exterior and all holes.
fn hit(polygon: &CountryPolygon, point: Coord<f64>, candidate_count: usize) -> Option<f64> {
    polygon
        .containing_exterior(point)
        .map(|exterior| confidence::score(point, exterior, polygon.holes(), candidate_count))
}

/// Highest confidence wins; ties go to the earliest hit.
fn best_hit(hits: &[Hit]) -> Option<&Hit> {
    hits.iter().fold(None, |best, h| match best {
        Some(b) if b.confidence >= h.confidence => Some(b),
        _ => Some(h),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeoError;
    use crate::models::CountryMetadata;
    use crate::resolver::ResolverOptions;
    use crate::store::{CountryStore, GeohashIndex};
    use geo::LineString;
    use hashbrown::HashMap;

    fn rect(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> LineString<f64> {
        LineString::from(vec![
            (min_lon, min_lat),
            (max_lon, min_lat),
            (max_lon, max_lat),
            (min_lon, max_lat),
        ])
    }

    fn index_for(cells: &[(f64, f64)], ids: Vec<CountryId>) -> GeohashIndex {
        cells
            .iter()
            .map(|&(lat, lon)| (geohash::encode(lat, lon, 6).unwrap(), ids.clone()))
            .collect()
    }

    /// Two countries: 1 spans lon 0..10, 2 spans lon 10..20, both lat 0..10.
    fn polygons() -> HashMap<CountryId, CountryPolygon> {
        let mut polygons = HashMap::new();
        polygons.insert(1, CountryPolygon::simple(rect(0.0, 0.0, 10.0, 10.0)));
        polygons.insert(2, CountryPolygon::simple(rect(10.0, 0.0, 20.0, 10.0)));
        polygons
    }

    fn metadata() -> HashMap<CountryId, CountryMetadata> {
        let mut metadata = HashMap::new();
        metadata.insert(1, CountryMetadata::new("Westland").with_iso("WL", "WLD"));
        metadata.insert(2, CountryMetadata::new("Eastland").with_iso("EL", "ELD"));
        metadata
    }

    #[test]
    fn test_indexed_match() {
        let store =
            CountryStore::from_parts(index_for(&[(5.0, 5.0)], vec![1]), polygons(), metadata());
        let r = Resolver::new(&store).resolve_coordinates(5.0, 5.0).unwrap();
        assert_eq!(r.country_id, Some(1));
        assert_eq!(r.iso2.as_deref(), Some("WL"));
        assert_eq!(r.confidence, 0.98);
    }

    #[test]
    fn test_invalid_input() {
        let store = CountryStore::from_parts(GeohashIndex::new(), polygons(), metadata());
        let resolver = Resolver::new(&store);
        assert!(matches!(
            resolver.resolve_coordinates(95.0, 0.0),
            Err(GeoError::InvalidLatitude(_))
        ));
        assert!(matches!(
            resolver.resolve_coordinates(0.0, -200.0),
            Err(GeoError::InvalidLongitude(_))
        ));
    }

    #[test]
    fn test_ambiguous_cell_picks_higher_confidence() {
        // Both countries indexed for the cell; the point is 0.5° inside country 2.
        let store = CountryStore::from_parts(
            index_for(&[(5.0, 10.5)], vec![1, 2]),
            polygons(),
            metadata(),
        );
        let r = Resolver::new(&store).resolve_coordinates(5.0, 10.5).unwrap();
        assert_eq!(r.country_id, Some(2));
        // 0.98 minus one extra candidate
        assert!((r.confidence - 0.93).abs() < 1e-9);
    }

    #[test]
    fn test_index_miss_uses_discounted_fallback() {
        // The cell wrongly lists only country 1.
        let store =
            CountryStore::from_parts(index_for(&[(5.0, 15.0)], vec![1]), polygons(), metadata());
        let r = Resolver::new(&store).resolve_coordinates(5.0, 15.0).unwrap();
        assert_eq!(r.country_id, Some(2));
        assert!((r.confidence - 0.98 * 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_discount_above_one_is_capped() {
        let store =
            CountryStore::from_parts(index_for(&[(5.0, 15.0)], vec![1]), polygons(), metadata());
        let opts = ResolverOptions {
            fallback_discount: 1.5,
            ..Default::default()
        };
        let r = Resolver::with_options(&store, opts)
            .resolve_coordinates(5.0, 15.0)
            .unwrap();
        assert_eq!(r.country_id, Some(2));
        assert_eq!(r.confidence, confidence::MAX_CONFIDENCE);
    }

    #[test]
    fn test_fallback_can_be_disabled() {
        let store =
            CountryStore::from_parts(index_for(&[(5.0, 15.0)], vec![1]), polygons(), metadata());
        let opts = ResolverOptions {
            exhaustive_fallback: false,
            ..Default::default()
        };
        let r = Resolver::with_options(&store, opts)
            .resolve_coordinates(5.0, 15.0)
            .unwrap();
        assert!(!r.is_match());
    }

    #[test]
    fn test_empty_index_scans_everything() {
        let store = CountryStore::from_parts(GeohashIndex::new(), polygons(), metadata());
        let r = Resolver::new(&store).resolve_coordinates(5.0, 15.0).unwrap();
        assert_eq!(r.country_id, Some(2));
        // Full scan proposes both countries: 0.98 - 0.05
        assert!((r.confidence - 0.93).abs() < 1e-9);
    }

    #[test]
    fn test_ocean_is_no_match() {
        let store = CountryStore::from_parts(GeohashIndex::new(), polygons(), metadata());
        let r = Resolver::new(&store)
            .resolve_coordinates(-30.0, -30.0)
            .unwrap();
        assert_eq!(r, ResolutionResult::no_match());
    }

    #[test]
    fn test_candidate_without_polygon_is_skipped() {
        let store = CountryStore::from_parts(
            index_for(&[(5.0, 5.0)], vec![99, 1]),
            polygons(),
            metadata(),
        );
        let r = Resolver::new(&store).resolve_coordinates(5.0, 5.0).unwrap();
        assert_eq!(r.country_id, Some(1));
    }

    #[test]
    fn test_missing_metadata_is_fatal() {
        let mut meta = metadata();
        meta.remove(&1);
        let index = index_for(&[(5.0, 5.0)], vec![1]);
        let store = CountryStore::from_parts(index, polygons(), meta);
        let err = Resolver::new(&store)
            .resolve_coordinates(5.0, 5.0)
            .unwrap_err();
        assert!(matches!(
            err,
            GeoError::DataConsistency {
                country_id: 1,
                missing: "metadata"
            }
        ));
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_repeat_calls_identical() {
        let store = CountryStore::from_parts(
            index_for(&[(5.0, 9.99)], vec![1, 2]),
            polygons(),
            metadata(),
        );
        let resolver = Resolver::new(&store);
        let first = resolver.resolve_coordinates(5.0, 9.99).unwrap();
        for _ in 0..10 {
            let again = resolver.resolve_coordinates(5.0, 9.99).unwrap();
            assert_eq!(again, first);
            assert_eq!(again.confidence.to_bits(), first.confidence.to_bits());
        }
    }

    #[test]
    fn test_best_hit_tie_keeps_first() {
        let hits = [
            Hit {
                id: 3,
                confidence: 0.9,
            },
            Hit {
                id: 1,
                confidence: 0.9,
            },
            Hit {
                id: 2,
                confidence: 0.5,
            },
        ];
        assert_eq!(best_hit(&hits).map(|h| h.id), Some(3));
        assert_eq!(best_hit(&[]), None);
    }
}
