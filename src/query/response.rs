//! JSON bodies returned by the query server and error-to-status mapping.

use axum::http::StatusCode;
use serde::Serialize;
use tracing::error;

use geocountry::{CountryId, GeoError, ResolutionResult, ReverseResolutionResult};

#[derive(Debug, Serialize, PartialEq)]
pub struct CountryBody {
    pub id: CountryId,
    pub name: String,
    pub iso2: Option<String>,
    pub iso3: Option<String>,
    pub continent: Option<String>,
    pub timezone: Option<String>,
}

/// Response for `/v1/reverse`
#[derive(Debug, Serialize)]
pub struct ReverseResponse {
    pub lat: f64,
    pub lon: f64,
    /// Absent when the point is in no country
    pub country: Option<CountryBody>,
    pub confidence: f64,
    pub band: Option<&'static str>,
}

impl ReverseResponse {
    pub fn new(lat: f64, lon: f64, result: ResolutionResult) -> Self {
        let band = result.band().map(|b| b.as_str());
        let confidence = result.confidence;
        let country = match (result.country_id, result.name) {
            (Some(id), Some(name)) => Some(CountryBody {
                id,
                name,
                iso2: result.iso2,
                iso3: result.iso3,
                continent: result.continent,
                timezone: result.timezone,
            }),
            _ => None,
        };
        Self {
            lat,
            lon,
            country,
            confidence,
            band,
        }
    }
}

/// Response for `/v1/country`
#[derive(Debug, Serialize)]
pub struct CountryResponse {
    pub country: CountryBody,
    pub lat: f64,
    pub lon: f64,
    pub confidence: f64,
}

impl From<ReverseResolutionResult> for CountryResponse {
    fn from(result: ReverseResolutionResult) -> Self {
        Self {
            lat: result.latitude(),
            lon: result.longitude(),
            confidence: result.confidence,
            country: CountryBody {
                id: result.country_id,
                name: result.name,
                iso2: result.iso2,
                iso3: result.iso3,
                continent: result.continent,
                timezone: result.timezone,
            },
        }
    }
}

/// Response for `/v1/distance`
#[derive(Debug, Serialize)]
pub struct DistanceResponse {
    pub from: String,
    pub to: String,
    pub distance: f64,
    pub unit: &'static str,
    pub method: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub countries: usize,
    pub cells: usize,
}

pub fn status_for(err: &GeoError) -> StatusCode {
    match err {
        e if e.is_input_error() => StatusCode::BAD_REQUEST,
        GeoError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map a library error onto an HTTP error response, logging server faults.
pub fn api_error(err: GeoError) -> (StatusCode, String) {
    let status = status_for(&err);
    if status.is_server_error() {
        error!("Resolution failed: {}", err);
    }
    (status, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geocountry::{CountryMetadata, GeoPoint};

    #[test]
    fn test_status_mapping() {
        let bad_lat = GeoError::InvalidLatitude(91.0);
        assert_eq!(status_for(&bad_lat), StatusCode::BAD_REQUEST);
        let bad_unit = GeoError::InvalidArgument("unit".into());
        assert_eq!(status_for(&bad_unit), StatusCode::BAD_REQUEST);
        let missing = GeoError::NotFound("x".into());
        assert_eq!(status_for(&missing), StatusCode::NOT_FOUND);
        let fault = GeoError::DataConsistency {
            country_id: 1,
            missing: "polygon",
        };
        assert_eq!(status_for(&fault), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_reverse_response_no_match() {
        let body = ReverseResponse::new(0.0, 0.0, ResolutionResult::no_match());
        assert!(body.country.is_none());
        assert_eq!(body.band, None);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["country"], serde_json::Value::Null);
        assert_eq!(json["confidence"], 0.0);
    }

    #[test]
    fn test_reverse_response_match() {
        let meta = CountryMetadata::new("France").with_iso("FR", "FRA");
        let body = ReverseResponse::new(46.0, 2.0, ResolutionResult::matched(7, &meta, 0.95));
        assert_eq!(body.band, Some("high"));
        assert_eq!(body.country.map(|c| c.iso3), Some(Some("FRA".to_string())));
    }

    #[test]
    fn test_country_response() {
        let meta = CountryMetadata::new("France").with_iso("FR", "FRA");
        let result = ReverseResolutionResult::new(7, GeoPoint::new_unchecked(46.5, 1.4), &meta);
        let json = serde_json::to_value(CountryResponse::from(result)).unwrap();
        assert_eq!(json["country"]["name"], "France");
        assert_eq!(json["lat"], 46.5);
        assert_eq!(json["confidence"], 1.0);
    }
}
