//! Read-only country data: geohash index, polygons and metadata.
//!
//! The store is populated once (from files via [`loader`], or in memory via
//! [`CountryStore::from_parts`]) and never mutated afterwards, so a shared
//! reference can be used from any number of threads.

pub mod builder;
pub mod loader;

use hashbrown::HashMap;
use tracing::info;

use crate::geohash::DEFAULT_PRECISION;
use crate::models::{CountryId, CountryMetadata, CountryPolygon};

pub use builder::{build_geohash_index, BuildOptions};
pub use loader::DataPaths;

/// Geohash cell → ids of countries whose territory intersects the cell.
pub type GeohashIndex = HashMap<String, Vec<CountryId>>;

/// Accessors the resolver needs from a data source.
pub trait CountryData: Send + Sync {
    /// Countries indexed for `geohash`.
    ///
    /// Falls back to the longest indexed prefix of `geohash`; empty when
    /// nothing matches.
    fn candidate_countries(&self, geohash: &str) -> &[CountryId];

    fn polygon(&self, id: CountryId) -> Option<&CountryPolygon>;

    fn metadata(&self, id: CountryId) -> Option<&CountryMetadata>;

    /// Every country with geometry, ascending.
    fn all_country_ids(&self) -> &[CountryId];

    /// Every country with a metadata record, ascending.
    fn metadata_ids(&self) -> &[CountryId];

    /// Geohash length of the index keys.
    fn precision(&self) -> usize {
        DEFAULT_PRECISION
    }
}

/// In-memory [`CountryData`] implementation.
#[derive(Debug, Clone)]
pub struct CountryStore {
    index: GeohashIndex,
    polygons: HashMap<CountryId, CountryPolygon>,
    metadata: HashMap<CountryId, CountryMetadata>,
    polygon_ids: Vec<CountryId>,
    metadata_ids: Vec<CountryId>,
    precision: usize,
}

impl CountryStore {
    pub fn from_parts(
        index: GeohashIndex,
        polygons: HashMap<CountryId, CountryPolygon>,
        metadata: HashMap<CountryId, CountryMetadata>,
    ) -> Self {
        let mut polygon_ids: Vec<CountryId> = polygons.keys().copied().collect();
        polygon_ids.sort_unstable();
        let mut metadata_ids: Vec<CountryId> = metadata.keys().copied().collect();
        metadata_ids.sort_unstable();

        let precision = index
            .keys()
            .map(String::len)
            .max()
            .unwrap_or(DEFAULT_PRECISION);

        info!(
            "Country store ready: {} polygons, {} metadata records, {} index cells (precision {})",
            polygon_ids.len(),
            metadata_ids.len(),
            index.len(),
            precision
        );

        Self {
            index,
            polygons,
            metadata,
            polygon_ids,
            metadata_ids,
            precision,
        }
    }

    /// Number of countries with geometry
    pub fn len(&self) -> usize {
        self.polygon_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygon_ids.is_empty()
    }

    /// Number of indexed geohash cells
    pub fn cell_count(&self) -> usize {
        self.index.len()
    }

    pub fn index(&self) -> &GeohashIndex {
        &self.index
    }
}

impl CountryData for CountryStore {
    fn candidate_countries(&self, geohash: &str) -> &[CountryId] {
        if let Some(ids) = self.index.get(geohash) {
            return ids;
        }
        (1..geohash.len())
            .rev()
            .find_map(|len| geohash.get(..len).and_then(|prefix| self.index.get(prefix)))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn polygon(&self, id: CountryId) -> Option<&CountryPolygon> {
        self.polygons.get(&id)
    }

    fn metadata(&self, id: CountryId) -> Option<&CountryMetadata> {
        self.metadata.get(&id)
    }

    fn all_country_ids(&self) -> &[CountryId] {
        &self.polygon_ids
    }

    fn metadata_ids(&self) -> &[CountryId] {
        &self.metadata_ids
    }

    fn precision(&self) -> usize {
        self.precision
    }
}
