//! Geohash encoding, decoding and neighbor computation.
//!
//! A geohash interleaves longitude and latitude bisection bits (longitude
//! first) and packs each group of five bits into a base-32 character.

use geo::{Coord, Rect};

use crate::error::{GeoError, Result};
use crate::models::point::{validate, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Geohash base-32 alphabet (no "a", "i", "l", "o")
pub const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Precision the shipped index is built at
pub const DEFAULT_PRECISION: usize = 6;

pub const MAX_PRECISION: usize = 12;

/// A decoded geohash cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedGeohash {
    /// Latitude of the cell centre
    pub lat: f64,
    /// Longitude of the cell centre
    pub lon: f64,
    /// (min, max) latitude of the cell
    pub lat_range: (f64, f64),
    /// (min, max) longitude of the cell
    pub lon_range: (f64, f64),
}

impl DecodedGeohash {
    /// Cell height in degrees
    pub fn lat_step(&self) -> f64 {
        self.lat_range.1 - self.lat_range.0
    }

    /// Cell width in degrees
    pub fn lon_step(&self) -> f64 {
        self.lon_range.1 - self.lon_range.0
    }

    pub fn center(&self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }

    pub fn bounds(&self) -> Rect<f64> {
        Rect::new(
            Coord {
                x: self.lon_range.0,
                y: self.lat_range.0,
            },
            Coord {
                x: self.lon_range.1,
                y: self.lat_range.1,
            },
        )
    }

    /// True if (lat, lon) lies within the closed cell bounds.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.lat_range.0..=self.lat_range.1).contains(&lat)
            && (self.lon_range.0..=self.lon_range.1).contains(&lon)
    }
}

/// Compass direction of a neighboring cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// All eight directions, clockwise from north.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// (lat, lon) offset in cell steps
    fn offset(self) -> (f64, f64) {
        match self {
            Direction::North => (1.0, 0.0),
            Direction::NorthEast => (1.0, 1.0),
            Direction::East => (0.0, 1.0),
            Direction::SouthEast => (-1.0, 1.0),
            Direction::South => (-1.0, 0.0),
            Direction::SouthWest => (-1.0, -1.0),
            Direction::West => (0.0, -1.0),
            Direction::NorthWest => (1.0, -1.0),
        }
    }
}

/// Encode a coordinate into a geohash of `precision` characters.
pub fn encode(lat: f64, lon: f64, precision: usize) -> Result<String> {
    validate(lat, lon)?;
    if precision == 0 || precision > MAX_PRECISION {
        return Err(GeoError::InvalidPrecision(precision));
    }

    let mut lat_range = (MIN_LAT, MAX_LAT);
    let mut lon_range = (MIN_LON, MAX_LON);
    let mut hash = String::with_capacity(precision);

    let mut bit = 0;
    let mut ch = 0usize;
    let mut even = true;

    while hash.len() < precision {
        let (value, range) = if even {
            (lon, &mut lon_range)
        } else {
            (lat, &mut lat_range)
        };
        let mid = (range.0 + range.1) / 2.0;
        if value >= mid {
            ch |= 1 << (4 - bit);
            range.0 = mid;
        } else {
            range.1 = mid;
        }
        even = !even;

        if bit < 4 {
            bit += 1;
        } else {
            hash.push(BASE32[ch] as char);
            bit = 0;
            ch = 0;
        }
    }

    Ok(hash)
}

/// Decode a geohash into its cell centre and bounds.
///
/// Accepts 1 to [`MAX_PRECISION`] characters, the same lengths `encode`
/// produces.
pub fn decode(geohash: &str) -> Result<DecodedGeohash> {
    if geohash.is_empty() || geohash.len() > MAX_PRECISION {
        return Err(GeoError::InvalidGeohash(geohash.to_string()));
    }

    let mut lat_range = (MIN_LAT, MAX_LAT);
    let mut lon_range = (MIN_LON, MAX_LON);
    let mut even = true;

    for c in geohash.bytes() {
        let idx = BASE32
            .iter()
            .position(|&b| b == c)
            .ok_or_else(|| GeoError::InvalidGeohash(geohash.to_string()))?;

        for shift in (0..5).rev() {
            let range = if even {
                &mut lon_range
            } else {
                &mut lat_range
            };
            let mid = (range.0 + range.1) / 2.0;
            if idx & (1 << shift) != 0 {
                range.0 = mid;
            } else {
                range.1 = mid;
            }
            even = !even;
        }
    }

    Ok(DecodedGeohash {
        lat: (lat_range.0 + lat_range.1) / 2.0,
        lon: (lon_range.0 + lon_range.1) / 2.0,
        lat_range,
        lon_range,
    })
}

/// Geohash of the adjacent cell in `direction`.
///
/// Longitude wraps across the antimeridian. Stepping past a pole continues
/// down the far side of it, i.e. into the same row half a world away.
pub fn neighbor(geohash: &str, direction: Direction) -> Result<String> {
    let cell = decode(geohash)?;
    step(&cell, direction, geohash.len())
}

/// The eight adjacent cells, clockwise from north.
///
/// Every result has the same length as `geohash`, and the eight are distinct.
pub fn neighbors(geohash: &str) -> Result<[String; 8]> {
    let cell = decode(geohash)?;
    let mut out: [String; 8] = Default::default();
    for (slot, direction) in out.iter_mut().zip(Direction::ALL) {
        *slot = step(&cell, direction, geohash.len())?;
    }
    Ok(out)
}

/// The 32 cells one character finer than `geohash`.
pub fn children(geohash: &str) -> impl Iterator<Item = String> + '_ {
    BASE32.iter().map(move |&c| {
        let mut child = String::with_capacity(geohash.len() + 1);
        child.push_str(geohash);
        child.push(c as char);
        child
    })
}

fn step(cell: &DecodedGeohash, direction: Direction, precision: usize) -> Result<String> {
    let (dlat, dlon) = direction.offset();
    let mut lat = cell.lat + dlat * cell.lat_step();
    let mut lon = cell.lon + dlon * cell.lon_step();

    if lat > MAX_LAT {
        lat = 2.0 * MAX_LAT - lat;
        lon += 180.0;
    } else if lat < MIN_LAT {
        lat = 2.0 * MIN_LAT - lat;
        lon += 180.0;
    }

    encode(lat, wrap_lon(lon), precision)
}

/// Wrap a longitude into [-180, 180).
fn wrap_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}
