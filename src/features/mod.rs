//! Features layered on top of the resolver.

pub mod distance;
pub mod geofence;
pub mod random;

pub use distance::{haversine, vincenty, DistanceMethod, DistanceUnit};
pub use geofence::Geofence;
