//! Point-in-Polygon (PIP) geometry and confidence scoring.
//!
//! Ray-casting containment against country rings, boundary distances, and
//! the score that turns border proximity into a confidence value.

pub mod confidence;
pub mod geometry;

pub use confidence::ConfidenceBand;
pub use geometry::{distance_to_edge, point_in_polygon, point_in_polygon_with_holes};
