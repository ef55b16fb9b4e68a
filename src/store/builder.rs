//! Offline construction of the geohash index.
//!
//! Cells are subdivided from one character down to the target precision.
//! Countries whose bounding box touches a cell are found through an R-tree
//! of country envelopes, then classified against the cell:
//!
//! - FULL: the cell centre is inside and no boundary lies within the cell's
//!   half-diagonal, so the whole cell is inside.
//! - OUTSIDE: the same clearance, centre outside.
//! - PARTIAL: a boundary passes near the cell.
//!
//! Cells with no PARTIAL country are final. Otherwise the cell is split, and
//! at the target precision PARTIAL countries are kept only when a sample
//! point of the cell lands inside them.

use geo::{Coord, Rect};
use hashbrown::HashMap;
use rayon::prelude::*;
use rstar::{RTree, RTreeObject, AABB};
use tracing::{debug, info};

use super::GeohashIndex;
use crate::error::{GeoError, Result};
use crate::geohash::{self, DecodedGeohash, DEFAULT_PRECISION, MAX_PRECISION};
use crate::models::{CountryId, CountryPolygon};

/// Sample positions along each cell axis, as fractions of the cell
const SAMPLE_FRACTIONS: [f64; 3] = [0.0, 0.5, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Geohash length of the finest cells
    pub precision: usize,
    /// Store a coarse cell when every country in it covers it entirely
    pub compact: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            compact: true,
        }
    }
}

/// R-tree entry for a country's bounding box
struct IndexedCountry {
    id: CountryId,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedCountry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedCountry {
    fn new(id: CountryId, polygon: &CountryPolygon) -> Option<Self> {
        Some(Self {
            id,
            envelope: to_aabb(polygon.bounding_rect()?),
        })
    }
}

fn to_aabb(rect: Rect<f64>) -> AABB<[f64; 2]> {
    let (min, max) = (rect.min(), rect.max());
    AABB::from_corners([min.x, min.y], [max.x, max.y])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coverage {
    Full,
    Outside,
    Partial,
}

struct IndexBuilder<'a> {
    polygons: &'a HashMap<CountryId, CountryPolygon>,
    tree: RTree<IndexedCountry>,
    options: BuildOptions,
}

/// Build a geohash index for `polygons`.
pub fn build_geohash_index(
    polygons: &HashMap<CountryId, CountryPolygon>,
    options: &BuildOptions,
) -> Result<GeohashIndex> {
    build_geohash_index_with(polygons, options, |_| {})
}

/// Like [`build_geohash_index`], calling `on_root` as each of the 32
/// top-level cells completes.
pub fn build_geohash_index_with<F>(
    polygons: &HashMap<CountryId, CountryPolygon>,
    options: &BuildOptions,
    on_root: F,
) -> Result<GeohashIndex>
where
    F: Fn(&str) + Sync,
{
    if options.precision == 0 || options.precision > MAX_PRECISION {
        return Err(GeoError::InvalidPrecision(options.precision));
    }

    info!(
        "Building geohash index for {} countries at precision {}...",
        polygons.len(),
        options.precision
    );

    let indexed: Vec<IndexedCountry> = polygons
        .iter()
        .filter_map(|(id, poly)| IndexedCountry::new(*id, poly))
        .collect();
    let builder = IndexBuilder {
        polygons,
        tree: RTree::bulk_load(indexed),
        options: *options,
    };

    let roots: Vec<String> = geohash::children("").collect();
    let parts: Vec<Vec<(String, Vec<CountryId>)>> = roots
        .par_iter()
        .map(|root| -> Result<Vec<(String, Vec<CountryId>)>> {
            let mut cells = Vec::new();
            builder.visit(root, &mut cells)?;
            debug!("Root cell '{}': {} index entries", root, cells.len());
            on_root(root);
            Ok(cells)
        })
        .collect::<Result<_>>()?;

    let index: GeohashIndex = parts.into_iter().flatten().collect();
    info!("Geohash index built with {} cells", index.len());
    Ok(index)
}

impl IndexBuilder<'_> {
    fn visit(&self, cell: &str, out: &mut Vec<(String, Vec<CountryId>)>) -> Result<()> {
        let decoded = geohash::decode(cell)?;
        let at_target = cell.len() >= self.options.precision;

        let mut full = Vec::new();
        let mut partial = Vec::new();
        for id in self.candidates(&decoded) {
            let Some(polygon) = self.polygons.get(&id) else {
                continue;
            };
            match classify(polygon, &decoded) {
                Coverage::Full => full.push(id),
                Coverage::Partial => partial.push((id, polygon)),
                Coverage::Outside => {}
            }
        }

        if partial.is_empty() {
            if full.is_empty() {
                return Ok(());
            }
            if self.options.compact || at_target {
                emit(cell, full, out);
                return Ok(());
            }
        }

        if at_target {
            full.extend(
                partial
                    .into_iter()
                    .filter(|(_, polygon)| samples_hit(polygon, &decoded))
                    .map(|(id, _)| id),
            );
            if !full.is_empty() {
                emit(cell, full, out);
            }
            return Ok(());
        }

        for child in geohash::children(cell) {
            self.visit(&child, out)?;
        }
        Ok(())
    }

    fn candidates(&self, cell: &DecodedGeohash) -> Vec<CountryId> {
        let envelope = to_aabb(cell.bounds());
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|ic| ic.id)
            .collect()
    }
}

fn emit(cell: &str, mut ids: Vec<CountryId>, out: &mut Vec<(String, Vec<CountryId>)>) {
    ids.sort_unstable();
    ids.dedup();
    out.push((cell.to_string(), ids));
}

fn classify(polygon: &CountryPolygon, cell: &DecodedGeohash) -> Coverage {
    let center = cell.center();
    let half_diagonal = cell.lat_step().hypot(cell.lon_step()) / 2.0;
    if polygon.boundary_distance(center) <= half_diagonal {
        return Coverage::Partial;
    }
    if polygon.contains(center) {
        Coverage::Full
    } else {
        Coverage::Outside
    }
}

fn samples_hit(polygon: &CountryPolygon, cell: &DecodedGeohash) -> bool {
    SAMPLE_FRACTIONS.iter().any(|fy| {
        SAMPLE_FRACTIONS.iter().any(|fx| {
            polygon.contains(Coord {
                x: cell.lon_range.0 + fx * cell.lon_step(),
                y: cell.lat_range.0 + fy * cell.lat_step(),
            })
        })
    })
}
