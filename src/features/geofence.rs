//! Point-in-region checks against circles and countries.

use crate::error::{GeoError, Result};
use crate::features::distance::haversine;
use crate::models::{point, CountryId, GeoPoint};
use crate::resolver::Resolver;
use crate::store::CountryData;

#[derive(Debug, Clone, PartialEq)]
pub enum Geofence {
    /// Points within `radius_km` of `center` along the great circle
    Circle { center: GeoPoint, radius_km: f64 },
    /// Points the forward resolver assigns to this country
    Country(CountryId),
}

impl Geofence {
    pub fn circle(center: GeoPoint, radius_km: f64) -> Result<Self> {
        point::validate(center.lat, center.lon)?;
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(GeoError::InvalidArgument(format!(
                "geofence radius must be a non-negative number of km, got {}",
                radius_km
            )));
        }
        Ok(Geofence::Circle { center, radius_km })
    }
}

impl<'a, D: CountryData + ?Sized> Resolver<'a, D> {
    /// A fence covering the country `identifier` refers to.
    pub fn country_fence(&self, identifier: &str) -> Result<Geofence> {
        let (id, _) = self
            .find_country(identifier)
            .ok_or_else(|| GeoError::NotFound(identifier.trim().to_string()))?;
        Ok(Geofence::Country(id))
    }

    /// Whether the point lies inside `fence`.
    pub fn within(&self, fence: &Geofence, lat: f64, lon: f64) -> Result<bool> {
        match fence {
            Geofence::Circle { center, radius_km } => {
                let point = GeoPoint::new(lat, lon)?;
                Ok(haversine(*center, point) <= *radius_km)
            }
            Geofence::Country(id) => {
                let result = self.resolve_coordinates(lat, lon)?;
                Ok(result.country_id == Some(*id))
            }
        }
    }
}
