//! Loading country data from JSON files.
//!
//! Each table is a JSON object keyed by geohash or country id. Files whose
//! name ends in `.gz` are gzip-decoded on the fly.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use geo_types::{Coord, LineString};
use hashbrown::HashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{CountryStore, GeohashIndex};
use crate::error::Result;
use crate::models::{CountryId, CountryMetadata, CountryPolygon};

/// Locations of the three data tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPaths {
    pub index: PathBuf,
    pub polygons: PathBuf,
    pub metadata: PathBuf,
}

impl DataPaths {
    /// Default file names inside a data directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            index: dir.join("geohash_index.json.gz"),
            polygons: dir.join("polygons.json.gz"),
            metadata: dir.join("metadata.json.gz"),
        }
    }
}

/// A ring as stored on disk: `[[lon, lat], ...]`.
pub type RingRecord = Vec<[f64; 2]>;

/// Exterior geometry: a single ring, or one ring per island.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExteriorRecord {
    Single(RingRecord),
    Multi(Vec<RingRecord>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonRecord {
    pub exterior: ExteriorRecord,
    #[serde(default)]
    pub holes: Vec<RingRecord>,
    /// Writer's multi-polygon flag. The exteriors decide; a mismatch is logged.
    #[serde(default)]
    pub is_multi: Option<bool>,
}

impl PolygonRecord {
    pub fn exterior_count(&self) -> usize {
        match &self.exterior {
            ExteriorRecord::Single(_) => 1,
            ExteriorRecord::Multi(rings) => rings.len(),
        }
    }

    /// True when the record carries an `is_multi` flag that contradicts its exteriors.
    pub fn has_flag_mismatch(&self) -> bool {
        self.is_multi
            .map(|flag| flag != (self.exterior_count() > 1))
            .unwrap_or(false)
    }
}

fn ring_from_record(ring: RingRecord) -> LineString<f64> {
    ring.into_iter()
        .map(|[lon, lat]| Coord { x: lon, y: lat })
        .collect()
}

impl From<PolygonRecord> for CountryPolygon {
    fn from(record: PolygonRecord) -> Self {
        let exteriors = match record.exterior {
            ExteriorRecord::Single(ring) => vec![ring_from_record(ring)],
            ExteriorRecord::Multi(rings) => rings.into_iter().map(ring_from_record).collect(),
        };
        let holes = record.holes.into_iter().map(ring_from_record).collect();
        CountryPolygon::new(exteriors, holes)
    }
}

impl CountryStore {
    /// Load all three tables from disk.
    pub fn load(paths: &DataPaths) -> Result<Self> {
        info!("Loading country data...");
        let index: GeohashIndex = read_json(&paths.index)?;
        let polygons = load_polygons(&paths.polygons)?;
        let metadata = load_metadata(&paths.metadata)?;
        Ok(CountryStore::from_parts(index, polygons, metadata))
    }
}

pub fn load_polygons(path: &Path) -> Result<HashMap<CountryId, CountryPolygon>> {
    let records: HashMap<CountryId, PolygonRecord> = read_json(path)?;
    info!("Loaded {} polygons from {}", records.len(), path.display());
    let polygons = records
        .into_iter()
        .map(|(id, record)| {
            if record.has_flag_mismatch() {
                warn!(
                    "Country {} is flagged is_multi={:?} but has {} exteriors",
                    id,
                    record.is_multi,
                    record.exterior_count()
                );
            }
            (id, CountryPolygon::from(record))
        })
        .collect();
    Ok(polygons)
}

pub fn load_metadata(path: &Path) -> Result<HashMap<CountryId, CountryMetadata>> {
    let metadata: HashMap<CountryId, CountryMetadata> = read_json(path)?;
    info!(
        "Loaded {} metadata records from {}",
        metadata.len(),
        path.display()
    );
    Ok(metadata)
}

fn is_gzip(path: &Path) -> bool {
    path.extension().map(|ext| ext == "gz").unwrap_or(false)
}

/// Deserialize a JSON file, decompressing `.gz` files.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = BufReader::new(File::open(path)?);
    let reader: Box<dyn Read> = if is_gzip(path) {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(serde_json::from_reader(reader)?)
}

/// Serialize to a JSON file, compressing when the name ends in `.gz`.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);
    if is_gzip(path) {
        let mut encoder = GzEncoder::new(file, Compression::default());
        serde_json::to_writer(&mut encoder, value)?;
        encoder.finish()?.flush()?;
    } else {
        let mut file = file;
        serde_json::to_writer(&mut file, value)?;
        file.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CountryData;
    use serde_json::json;

    #[test]
    fn test_single_and_multi_exterior() {
        let value = json!({"exterior": [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]});
        let single: PolygonRecord = serde_json::from_value(value).unwrap();
        assert!(matches!(single.exterior, ExteriorRecord::Single(_)));
        assert!(single.holes.is_empty());
        assert_eq!(single.is_multi, None);
        assert!(!single.has_flag_mismatch());

        let value = json!({
            "exterior": [
                [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
                [[5.0, 5.0], [6.0, 5.0], [6.0, 6.0]]
            ],
            "is_multi": true
        });
        let multi: PolygonRecord = serde_json::from_value(value).unwrap();
        assert_eq!(multi.exterior_count(), 2);
        assert!(!multi.has_flag_mismatch());
        let poly = CountryPolygon::from(multi);
        assert_eq!(poly.exteriors().len(), 2);
        assert!(poly.is_multi());
    }

    #[test]
    fn test_ring_axis_order() {
        let value = json!({"exterior": [[7.5, 48.0], [8.0, 48.0], [8.0, 49.0]]});
        let record: PolygonRecord = serde_json::from_value(value).unwrap();
        let poly = CountryPolygon::from(record);
        assert_eq!(poly.exteriors()[0].0[0], Coord { x: 7.5, y: 48.0 });
    }

    #[test]
    fn test_is_multi_flag_follows_exteriors() {
        let value = json!({
            "exterior": [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
            "is_multi": true
        });
        let record: PolygonRecord = serde_json::from_value(value).unwrap();
        assert!(record.has_flag_mismatch());

        let poly = CountryPolygon::from(record);
        assert_eq!(poly.exteriors().len(), 1);
        assert!(!poly.is_multi());

        let value = json!({
            "exterior": [
                [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
                [[5.0, 5.0], [6.0, 5.0], [6.0, 6.0]]
            ],
            "is_multi": false
        });
        let record: PolygonRecord = serde_json::from_value(value).unwrap();
        assert!(record.has_flag_mismatch());
        assert!(CountryPolygon::from(record).is_multi());
    }

    #[test]
    fn test_load_round_trip_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::in_dir(dir.path());

        write_json(&paths.index, &json!({"u0tecj": [250]})).unwrap();
        let polygons = json!({
            "250": {"exterior": [[7.0, 48.0], [8.0, 48.0], [8.0, 49.0], [7.0, 49.0]]}
        });
        write_json(&paths.polygons, &polygons).unwrap();
        let metadata = json!({
            "250": {
                "name": "France",
                "iso2": "FR",
                "iso3": "FRA",
                "continent": "Europe",
                "timezone": "Europe/Paris"
            }
        });
        write_json(&paths.metadata, &metadata).unwrap();

        let store = CountryStore::load(&paths).unwrap();
        assert_eq!(store.candidate_countries("u0tecj"), &[250]);
        assert_eq!(store.all_country_ids(), &[250]);
        assert_eq!(store.metadata(250).unwrap().iso3.as_deref(), Some("FRA"));
        let france = store.polygon(250).unwrap();
        assert!(france.contains(Coord { x: 7.5, y: 48.5 }));
    }

    #[test]
    fn test_plain_json_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        std::fs::write(&path, r#"{"1": {"name": "Kosovo", "iso2": "-99"}}"#).unwrap();
        let meta = load_metadata(&path).unwrap();
        assert_eq!(meta[&1].iso2, None);

        let missing = load_metadata(&dir.path().join("nope.json"));
        assert!(matches!(missing, Err(crate::error::GeoError::Io(_))));
    }
}
