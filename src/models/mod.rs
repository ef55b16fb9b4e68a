//! Core data models for country resolution.

pub mod country;
pub mod point;
pub mod result;

pub use country::{CountryId, CountryMetadata, CountryPolygon, ISO_SENTINEL};
pub use point::GeoPoint;
pub use result::{ResolutionResult, ReverseResolutionResult};
