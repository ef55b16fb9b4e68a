//! Border-proximity confidence scoring.
//!
//! Confidence is a proxy for how far a point sits from the nearest border of
//! the polygon that matched it, reduced when several countries competed for
//! the same cell.

use geo::{Coord, LineString};

use super::geometry::distance_to_edge;

pub const MIN_CONFIDENCE: f64 = 0.5;
pub const MAX_CONFIDENCE: f64 = 1.0;

/// Per extra candidate
const AMBIGUITY_STEP: f64 = 0.05;
const MAX_AMBIGUITY_PENALTY: f64 = 0.2;

/// Score a point matched by `exterior` (with the country's `holes`).
pub fn score(
    point: Coord<f64>,
    exterior: &LineString<f64>,
    holes: &[LineString<f64>],
    candidate_count: usize,
) -> f64 {
    let d = holes
        .iter()
        .map(|hole| distance_to_edge(point, hole))
        .fold(distance_to_edge(point, exterior), f64::min);

    score_distance(d, candidate_count)
}

/// Score from a precomputed boundary distance in degrees.
pub fn score_distance(distance: f64, candidate_count: usize) -> f64 {
    (base_confidence(distance) - ambiguity_penalty(candidate_count))
        .clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

/// Piecewise-linear map from boundary distance (degrees) to confidence.
pub fn base_confidence(d: f64) -> f64 {
    if d >= 0.1 {
        0.98
    } else if d >= 0.05 {
        0.88 + (d - 0.05) / 0.05 * 0.10
    } else if d >= 0.01 {
        0.75 + (d - 0.01) / 0.04 * 0.13
    } else {
        0.70 + d / 0.01 * 0.05
    }
}

/// Scale `confidence` by `factor`, keeping the result within
/// [0, `MAX_CONFIDENCE`].
pub fn discount(confidence: f64, factor: f64) -> f64 {
    (confidence * factor).clamp(0.0, MAX_CONFIDENCE)
}

pub fn ambiguity_penalty(candidate_count: usize) -> f64 {
    if candidate_count <= 1 {
        return 0.0;
    }
    ((candidate_count - 1) as f64 * AMBIGUITY_STEP).min(MAX_AMBIGUITY_PENALTY)
}

/// Coarse trust level for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfidenceBand {
    /// ≥ 0.9
    High,
    /// ≥ 0.7
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            ConfidenceBand::High
        } else if score >= 0.7 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceBand::High => "high",
            ConfidenceBand::Medium => "medium",
            ConfidenceBand::Low => "low",
        }
    }
}

impl std::fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
