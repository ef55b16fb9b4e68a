//! Country metadata and polygon geometry records.

use geo::{Coord, LineString, Rect};
use serde::{Deserialize, Deserializer, Serialize};

use crate::pip::geometry;

/// Stable country identifier assigned at data-build time.
///
/// The id is the only stable join key between index, polygons and metadata.
pub type CountryId = u32;

/// ISO code placeholder used by the source data for territories without one.
pub const ISO_SENTINEL: &str = "-99";

/// Descriptive record for a country.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryMetadata {
    pub name: String,

    /// ISO 3166-1 alpha-2 code (e.g., "FR")
    #[serde(default, deserialize_with = "iso_code")]
    pub iso2: Option<String>,

    /// ISO 3166-1 alpha-3 code (e.g., "FRA")
    #[serde(default, deserialize_with = "iso_code")]
    pub iso3: Option<String>,

    #[serde(default)]
    pub continent: Option<String>,

    /// IANA timezone (e.g., "Europe/Paris")
    #[serde(default)]
    pub timezone: Option<String>,
}

impl CountryMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_iso(mut self, iso2: &str, iso3: &str) -> Self {
        self.iso2 = Some(iso2.to_string());
        self.iso3 = Some(iso3.to_string());
        self
    }

    pub fn with_continent(mut self, continent: &str) -> Self {
        self.continent = Some(continent.to_string());
        self
    }

    pub fn with_timezone(mut self, timezone: &str) -> Self {
        self.timezone = Some(timezone.to_string());
        self
    }
}

/// Maps the "-99" sentinel and blank strings to `None`.
fn iso_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != ISO_SENTINEL))
}

/// Country geometry: one or more exterior rings sharing a single list of holes.
///
/// Coordinates are `x = lon`, `y = lat`. Rings need not repeat their first
/// point; the closing edge is implicit.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryPolygon {
    exteriors: Vec<LineString<f64>>,
    holes: Vec<LineString<f64>>,
}

impl CountryPolygon {
    pub fn new(exteriors: Vec<LineString<f64>>, holes: Vec<LineString<f64>>) -> Self {
        Self { exteriors, holes }
    }

    /// Single exterior ring without holes.
    pub fn simple(exterior: LineString<f64>) -> Self {
        Self::new(vec![exterior], Vec::new())
    }

    pub fn exteriors(&self) -> &[LineString<f64>] {
        &self.exteriors
    }

    pub fn holes(&self) -> &[LineString<f64>] {
        &self.holes
    }

    /// True for archipelagos and other countries with several exteriors.
    pub fn is_multi(&self) -> bool {
        self.exteriors.len() > 1
    }

    /// First exterior that contains `point` once holes are subtracted.
    pub fn containing_exterior(&self, point: Coord<f64>) -> Option<&LineString<f64>> {
        self.exteriors
            .iter()
            .find(|ext| geometry::point_in_polygon_with_holes(point, ext, &self.holes))
    }

    pub fn contains(&self, point: Coord<f64>) -> bool {
        self.containing_exterior(point).is_some()
    }

    /// Minimum planar distance (degrees) from `point` to any ring of this country.
    pub fn boundary_distance(&self, point: Coord<f64>) -> f64 {
        self.exteriors
            .iter()
            .chain(self.holes.iter())
            .map(|ring| geometry::distance_to_edge(point, ring))
            .fold(f64::INFINITY, f64::min)
    }

    /// Bounding box over all exteriors.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.exteriors
            .iter()
            .filter_map(geometry::bounding_box)
            .reduce(|a, b| {
                Rect::new(
                    Coord {
                        x: a.min().x.min(b.min().x),
                        y: a.min().y.min(b.min().y),
                    },
                    Coord {
                        x: a.max().x.max(b.max().x),
                        y: a.max().y.max(b.max().y),
                    },
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> LineString<f64> {
        LineString::from(vec![
            (x0, y0),
            (x0 + size, y0),
            (x0 + size, y0 + size),
            (x0, y0 + size),
        ])
    }

    #[test]
    fn test_iso_sentinel_is_absent() {
        let meta: CountryMetadata = serde_json::from_str(
            r#"{"name": "Northern Cyprus", "iso2": "-99", "iso3": " ", "continent": "Asia"}"#,
        )
        .unwrap();
        assert_eq!(meta.iso2, None);
        assert_eq!(meta.iso3, None);
        assert_eq!(meta.continent.as_deref(), Some("Asia"));
        assert_eq!(meta.timezone, None);
    }

    #[test]
    fn test_iso_present() {
        let json = r#"{"name": "France", "iso2": "FR", "iso3": "FRA"}"#;
        let meta: CountryMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.iso2.as_deref(), Some("FR"));
        assert_eq!(meta.iso3.as_deref(), Some("FRA"));
    }

    #[test]
    fn test_multi_exterior_contains() {
        let poly = CountryPolygon::new(vec![square(0.0, 0.0, 1.0), square(5.0, 5.0, 1.0)], vec![]);
        assert!(poly.is_multi());
        assert!(poly.contains(Coord { x: 5.5, y: 5.5 }));
        assert!(!poly.contains(Coord { x: 3.0, y: 3.0 }));

        let matched = poly.containing_exterior(Coord { x: 5.5, y: 5.5 }).unwrap();
        assert_eq!(matched, &square(5.0, 5.0, 1.0));
    }

    #[test]
    fn test_bounding_rect_spans_exteriors() {
        let poly = CountryPolygon::new(vec![square(0.0, 0.0, 1.0), square(5.0, 5.0, 1.0)], vec![]);
        let rect = poly.bounding_rect().unwrap();
        assert_eq!(rect.min(), Coord { x: 0.0, y: 0.0 });
        assert_eq!(rect.max(), Coord { x: 6.0, y: 6.0 });
    }

    #[test]
    fn test_boundary_distance_includes_holes() {
        let poly = CountryPolygon::new(vec![square(0.0, 0.0, 10.0)], vec![square(4.0, 4.0, 1.0)]);
        let d = poly.boundary_distance(Coord { x: 3.0, y: 4.5 });
        assert!((d - 1.0).abs() < 1e-12);
    }
}
