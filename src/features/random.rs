//! Random coordinates inside a country.

use geo::Coord;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::debug;

use crate::error::{GeoError, Result};
use crate::models::{CountryPolygon, GeoPoint};
use crate::pip::geometry::{bounding_box, point_in_polygon_with_holes};
use crate::resolver::Resolver;
use crate::store::CountryData;

pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

impl<'a, D: CountryData + ?Sized> Resolver<'a, D> {
    /// Draw a uniformly distributed point inside the country `identifier`
    /// refers to.
    ///
    /// An exterior is chosen with probability proportional to its bounding
    /// box area, then points are drawn from that box until one falls inside
    /// the exterior and outside every hole. `Ok(None)` after `max_attempts`
    /// misses.
    pub fn random_point<R: Rng + ?Sized>(
        &self,
        identifier: &str,
        rng: &mut R,
        max_attempts: usize,
    ) -> Result<Option<GeoPoint>> {
        let (id, _) = self
            .find_country(identifier)
            .ok_or_else(|| GeoError::NotFound(identifier.trim().to_string()))?;
        let polygon = self.polygon_of(id)?;

        let point = sample(polygon, rng, max_attempts);
        if point.is_none() {
            debug!(
                "No point found in country {} after {} attempts",
                id, max_attempts
            );
        }
        Ok(point)
    }
}

fn sample<R: Rng + ?Sized>(
    polygon: &CountryPolygon,
    rng: &mut R,
    max_attempts: usize,
) -> Option<GeoPoint> {
    let boxes: Vec<_> = polygon
        .exteriors()
        .iter()
        .filter_map(|ring| bounding_box(ring).map(|rect| (ring, rect)))
        .collect();
    let weights = boxes.iter().map(|(_, rect)| rect.width() * rect.height());
    // Fails when every box is degenerate; such rings contain nothing.
    let choose = WeightedIndex::new(weights).ok()?;

    for _ in 0..max_attempts {
        let (ring, rect) = &boxes[choose.sample(rng)];
        let candidate = Coord {
            x: rng.gen_range(rect.min().x..=rect.max().x),
            y: rng.gen_range(rect.min().y..=rect.max().y),
        };
        if point_in_polygon_with_holes(candidate, ring, polygon.holes()) {
            return Some(GeoPoint::from(candidate));
        }
    }
    None
}
