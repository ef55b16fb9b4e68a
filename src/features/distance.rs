//! Great-circle and ellipsoidal distances between points and countries.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{GeoError, Result};
use crate::models::GeoPoint;
use crate::resolver::Resolver;
use crate::store::CountryData;

/// Mean Earth radius (IUGG) in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

// WGS-84 ellipsoid
const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);

const VINCENTY_MAX_ITERATIONS: usize = 200;
const VINCENTY_TOLERANCE: f64 = 1e-12;

const KM_PER_MILE: f64 = 1.609_344;
const KM_PER_NAUTICAL_MILE: f64 = 1.852;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMethod {
    #[default]
    Haversine,
    /// Falls back to Haversine when the iteration fails to converge
    Vincenty,
}

impl DistanceMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMethod::Haversine => "haversine",
            DistanceMethod::Vincenty => "vincenty",
        }
    }
}

impl FromStr for DistanceMethod {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "haversine" => Ok(DistanceMethod::Haversine),
            "vincenty" => Ok(DistanceMethod::Vincenty),
            other => Err(GeoError::InvalidArgument(format!("unknown method '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceUnit {
    #[default]
    Kilometers,
    Miles,
    NauticalMiles,
}

impl DistanceUnit {
    /// Convert a distance in kilometers to this unit.
    pub fn convert(self, km: f64) -> f64 {
        match self {
            DistanceUnit::Kilometers => km,
            DistanceUnit::Miles => km / KM_PER_MILE,
            DistanceUnit::NauticalMiles => km / KM_PER_NAUTICAL_MILE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "mi",
            DistanceUnit::NauticalMiles => "nmi",
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceUnit {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "km" | "kilometers" | "kilometres" => Ok(DistanceUnit::Kilometers),
            "mi" | "miles" => Ok(DistanceUnit::Miles),
            "nm" | "nmi" | "nautical_miles" => Ok(DistanceUnit::NauticalMiles),
            other => Err(GeoError::InvalidArgument(format!("unknown unit '{}'", other))),
        }
    }
}

/// Great-circle distance in kilometers on a spherical Earth.
pub fn haversine(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let sin_half_lat = (delta_lat / 2.0).sin();
    let sin_half_lon = (delta_lon / 2.0).sin();
    let h = sin_half_lat.powi(2) + lat1.cos() * lat2.cos() * sin_half_lon.powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Geodesic distance in kilometers on the WGS-84 ellipsoid (Vincenty's
/// inverse formula).
///
/// Returns `None` when the iteration does not converge, which happens for
/// nearly antipodal points.
pub fn vincenty(a: GeoPoint, b: GeoPoint) -> Option<f64> {
    let l = (b.lon - a.lon).to_radians();
    let u1 = ((1.0 - WGS84_F) * a.lat.to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * b.lat.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..VINCENTY_MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let east = cos_u2 * sin_lambda;
        let north = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
        let sin_sigma = east.hypot(north);
        if sin_sigma == 0.0 {
            // coincident points
            return Some(0.0);
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // equatorial line
        let cos_2sigma_m = if cos_sq_alpha == 0.0 {
            0.0
        } else {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        };
        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));

        let cos_sq_2sigma_m = cos_2sigma_m * cos_2sigma_m;
        let inner = cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_sq_2sigma_m);

        let previous = lambda;
        lambda = l + (1.0 - c) * WGS84_F * sin_alpha * (sigma + c * sin_sigma * inner);

        if (lambda - previous).abs() < VINCENTY_TOLERANCE {
            let b_sq = WGS84_B * WGS84_B;
            let u_sq = cos_sq_alpha * (WGS84_A * WGS84_A - b_sq) / b_sq;
            let a_poly = 4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq));
            let big_a = 1.0 + u_sq / 16384.0 * a_poly;
            let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let tail = big_b / 6.0 * cos_2sigma_m * (-3.0 + 4.0 * sin_sigma * sin_sigma);
            let lead = cos_sigma * (-1.0 + 2.0 * cos_sq_2sigma_m);
            let term = lead - tail * (-3.0 + 4.0 * cos_sq_2sigma_m);
            let delta_sigma = big_b * sin_sigma * (cos_2sigma_m + big_b / 4.0 * term);
            return Some(WGS84_B * big_a * (sigma - delta_sigma) / 1000.0);
        }
    }
    None
}

/// Distance between two points in `unit`.
pub fn distance(a: GeoPoint, b: GeoPoint, method: DistanceMethod, unit: DistanceUnit) -> f64 {
    let km = match method {
        DistanceMethod::Haversine => haversine(a, b),
        DistanceMethod::Vincenty => vincenty(a, b).unwrap_or_else(|| {
            debug!(
                "Vincenty did not converge for {:?} -> {:?}, using haversine",
                a, b
            );
            haversine(a, b)
        }),
    };
    unit.convert(km)
}

impl<'a, D: CountryData + ?Sized> Resolver<'a, D> {
    /// Distance between the representative coordinates of two countries.
    pub fn country_distance(
        &self,
        from: &str,
        to: &str,
        method: DistanceMethod,
        unit: DistanceUnit,
    ) -> Result<f64> {
        let a = self.resolve_country(from)?;
        let b = self.resolve_country(to)?;
        Ok(distance(a.point, b.point, method, unit))
    }
}
