//! Synthetic world shared by the integration tests.
//!
//! Countries are axis-aligned rectangles given as `[min_lon, min_lat, max_lon, max_lat]`.

#![allow(dead_code)]

use std::sync::OnceLock;

use geo::LineString;
use hashbrown::HashMap;
use serde_json::{json, Value};

use geocountry::store::{build_geohash_index, BuildOptions};
use geocountry::{CountryId, CountryMetadata, CountryPolygon, CountryStore};

pub const PRECISION: usize = 5;

pub const UNITED_STATES: CountryId = 1;
pub const FRANCE: CountryId = 2;
pub const GERMANY: CountryId = 3;
pub const SOUTH_AFRICA: CountryId = 4;
pub const LESOTHO: CountryId = 5;
pub const NEW_ZEALAND: CountryId = 6;

pub struct Country {
    pub id: CountryId,
    pub name: &'static str,
    pub iso2: &'static str,
    pub iso3: &'static str,
    pub continent: &'static str,
    pub timezone: &'static str,
    pub exteriors: &'static [[f64; 4]],
    pub holes: &'static [[f64; 4]],
}

const LESOTHO_RECT: [f64; 4] = [27.0, -30.7, 29.5, -28.5];

pub const COUNTRIES: &[Country] = &[
    Country {
        id: UNITED_STATES,
        name: "United States",
        iso2: "US",
        iso3: "USA",
        continent: "North America",
        timezone: "America/New_York",
        exteriors: &[[-125.0, 25.0, -67.0, 49.0]],
        holes: &[],
    },
    Country {
        id: FRANCE,
        name: "France",
        iso2: "FR",
        iso3: "FRA",
        continent: "Europe",
        timezone: "Europe/Paris",
        exteriors: &[[-5.0, 42.0, 7.8, 51.0]],
        holes: &[],
    },
    Country {
        id: GERMANY,
        name: "Germany",
        iso2: "DE",
        iso3: "DEU",
        continent: "Europe",
        timezone: "Europe/Berlin",
        exteriors: &[[7.8, 47.0, 15.0, 55.0]],
        holes: &[],
    },
    Country {
        id: SOUTH_AFRICA,
        name: "South Africa",
        iso2: "ZA",
        iso3: "ZAF",
        continent: "Africa",
        timezone: "Africa/Johannesburg",
        exteriors: &[[16.0, -35.0, 33.0, -22.0]],
        holes: &[LESOTHO_RECT],
    },
    Country {
        id: LESOTHO,
        name: "Lesotho",
        iso2: "LS",
        iso3: "LSO",
        continent: "Africa",
        timezone: "Africa/Maseru",
        exteriors: &[LESOTHO_RECT],
        holes: &[],
    },
    Country {
        id: NEW_ZEALAND,
        name: "New Zealand",
        iso2: "NZ",
        iso3: "NZL",
        continent: "Oceania",
        timezone: "Pacific/Auckland",
        exteriors: &[[173.0, -41.0, 178.5, -34.5], [166.5, -47.0, 174.0, -41.5]],
        holes: &[],
    },
];

fn corners([min_lon, min_lat, max_lon, max_lat]: [f64; 4]) -> Vec<(f64, f64)> {
    vec![
        (min_lon, min_lat),
        (max_lon, min_lat),
        (max_lon, max_lat),
        (min_lon, max_lat),
    ]
}

fn ring(rect: [f64; 4]) -> LineString<f64> {
    LineString::from(corners(rect))
}

pub fn polygons() -> HashMap<CountryId, CountryPolygon> {
    COUNTRIES
        .iter()
        .map(|c| {
            let exteriors = c.exteriors.iter().copied().map(ring).collect();
            let holes = c.holes.iter().copied().map(ring).collect();
            (c.id, CountryPolygon::new(exteriors, holes))
        })
        .collect()
}

pub fn metadata() -> HashMap<CountryId, CountryMetadata> {
    COUNTRIES
        .iter()
        .map(|c| {
            let meta = CountryMetadata::new(c.name)
                .with_iso(c.iso2, c.iso3)
                .with_continent(c.continent)
                .with_timezone(c.timezone);
            (c.id, meta)
        })
        .collect()
}

/// The world as the on-disk polygon format.
pub fn polygons_json() -> Value {
    let entries = COUNTRIES.iter().map(|c| {
        let rings = |rects: &[[f64; 4]]| -> Vec<Value> {
            let point = |(x, y): (f64, f64)| json!([x, y]);
            rects
                .iter()
                .map(|r| Value::Array(corners(*r).into_iter().map(point).collect()))
                .collect()
        };
        let exterior = match rings(c.exteriors).as_slice() {
            [single] => single.clone(),
            many => Value::Array(many.to_vec()),
        };
        let record = json!({
            "exterior": exterior,
            "holes": rings(c.holes),
            "is_multi": c.exteriors.len() > 1,
        });
        (c.id.to_string(), record)
    });
    Value::Object(entries.collect())
}

/// The world as the on-disk metadata format.
pub fn metadata_json() -> Value {
    let entries = COUNTRIES.iter().map(|c| {
        let record = json!({
            "name": c.name,
            "iso2": c.iso2,
            "iso3": c.iso3,
            "continent": c.continent,
            "timezone": c.timezone,
        });
        (c.id.to_string(), record)
    });
    Value::Object(entries.collect())
}

/// Store built through the real index builder, once per test binary.
pub fn world() -> &'static CountryStore {
    static WORLD: OnceLock<CountryStore> = OnceLock::new();
    WORLD.get_or_init(|| {
        let polygons = polygons();
        let options = BuildOptions {
            precision: PRECISION,
            compact: true,
        };
        let index = build_geohash_index(&polygons, &options).unwrap();
        CountryStore::from_parts(index, polygons, metadata())
    })
}
