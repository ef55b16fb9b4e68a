//! Planar ring geometry: ray casting, boundary distance, centroids.
//!
//! Coordinates are treated as a flat plane with `x = lon` and `y = lat`.
//! Rings are open or closed; the edge from the last point back to the first
//! is always considered.

use geo::{BoundingRect, Centroid, Coord, LineString, Polygon, Rect};

/// Ray-casting point-in-polygon test.
///
/// Casts a ray towards increasing longitude and toggles on every edge that
/// straddles the point's latitude east of it. Rings with fewer than three
/// points contain nothing.
pub fn point_in_polygon(point: Coord<f64>, ring: &LineString<f64>) -> bool {
    let coords = &ring.0;
    let n = coords.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = coords[i];
        let b = coords[j];
        // Horizontal and zero-length edges never straddle.
        if (a.y > point.y) != (b.y > point.y) {
            let cross_x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

/// Inside `exterior` and inside none of `holes`.
pub fn point_in_polygon_with_holes(
    point: Coord<f64>,
    exterior: &LineString<f64>,
    holes: &[LineString<f64>],
) -> bool {
    point_in_polygon(point, exterior) && !holes.iter().any(|hole| point_in_polygon(point, hole))
}

/// Minimum planar distance in degrees from `point` to any edge of `ring`.
///
/// Returns `f64::INFINITY` for an empty ring.
pub fn distance_to_edge(point: Coord<f64>, ring: &LineString<f64>) -> f64 {
    let coords = &ring.0;
    let n = coords.len();
    if n == 0 {
        return f64::INFINITY;
    }

    let mut best = f64::INFINITY;
    let mut j = n - 1;
    for i in 0..n {
        best = best.min(segment_distance(point, coords[j], coords[i]));
        j = i;
    }
    best
}

/// Distance from `p` to the segment `a`-`b`. Degenerate segments act as points.
pub fn segment_distance(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return (p.x - a.x).hypot(p.y - a.y);
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
    let proj_x = a.x + t * dx;
    let proj_y = a.y + t * dy;
    (p.x - proj_x).hypot(p.y - proj_y)
}

/// Area centroid of the region bounded by `ring`.
///
/// Zero-area rings fall back to the centroid of their vertices/edges; empty
/// rings have none.
pub fn centroid(ring: &LineString<f64>) -> Option<Coord<f64>> {
    if ring.0.is_empty() {
        return None;
    }
    Polygon::new(ring.clone(), vec![])
        .centroid()
        .map(|p| p.0)
        .or_else(|| mean(&ring.0))
}

/// Arithmetic mean of a set of coordinates.
pub fn mean(coords: &[Coord<f64>]) -> Option<Coord<f64>> {
    if coords.is_empty() {
        return None;
    }
    let n = coords.len() as f64;
    let (sx, sy) = coords
        .iter()
        .fold((0.0, 0.0), |(sx, sy), c| (sx + c.x, sy + c.y));
    Some(Coord {
        x: sx / n,
        y: sy / n,
    })
}

pub fn bounding_box(ring: &LineString<f64>) -> Option<Rect<f64>> {
    ring.bounding_rect()
}
