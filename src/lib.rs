//! Geocountry - offline country resolution for coordinates and country names
//!
//! This library provides the geohash index, polygon tests and resolver shared by
//! the ingest and query binaries.

pub mod config;
pub mod error;
pub mod features;
pub mod geohash;
pub mod models;
pub mod pip;
pub mod resolver;
pub mod store;

pub use error::{GeoError, Result};
pub use models::{CountryId, CountryMetadata, CountryPolygon, GeoPoint};
pub use models::{ResolutionResult, ReverseResolutionResult};
pub use pip::ConfidenceBand;
pub use resolver::{Query, Resolution, Resolver, ResolverOptions};
pub use store::{CountryData, CountryStore, DataPaths};
