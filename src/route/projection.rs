//! Projection of a point onto a directed polyline.

use geo::{Coord, MultiLineString};

/// Where a point falls relative to a polyline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Closest point on the polyline
    pub foot: Coord<f64>,
    /// Distance along the polyline from its start to `foot`
    pub chainage: f64,
    /// Distance from the point to `foot`, with the sign of the side it lies on
    pub offset: f64,
    /// Unsigned distance from the point to `foot`
    pub distance: f64,
}

/// Project `point` onto `geometry`, clamping to its ends.
///
/// Offsets are positive to the left of the direction of travel (the
/// nearside under left-hand running) and negative to the right. A point on
/// the centreline has offset 0; one on its extension past either end is
/// treated as left of travel, so `offset.abs()` always equals `distance`. A
/// polyline with no length projects every point onto its first vertex
/// with chainage 0 and offset 0. Returns None for an empty geometry.
pub fn project(geometry: &MultiLineString<f64>, point: Coord<f64>) -> Option<Projection> {
    let mut best: Option<Projection> = None;
    let mut travelled = 0.0;

    for part in &geometry.0 {
        for line in part.lines() {
            let d = line.delta();
            let len_sq = d.x * d.x + d.y * d.y;
            let len = len_sq.sqrt();
            if len_sq <= 0.0 {
                continue;
            }

            let rel = point - line.start;
            let t = ((rel.x * d.x + rel.y * d.y) / len_sq).clamp(0.0, 1.0);
            let foot = line.start + d * t;
            let distance = (point.x - foot.x).hypot(point.y - foot.y);

            // Strictly closer only: at a shared vertex the earlier line keeps it
            if best.map_or(true, |b| distance < b.distance) {
                let cross = d.x * rel.y - d.y * rel.x;
                // Collinear points past an end count as left so |offset| == distance
                let side = if cross < 0.0 { -1.0 } else { 1.0 };
                best = Some(Projection {
                    foot,
                    chainage: travelled + t * len,
                    offset: side * distance,
                    distance,
                });
            }

            travelled += len;
        }
    }

    best.or_else(|| {
        let start = geometry.0.iter().find_map(|part| part.0.first().copied())?;
        Some(Projection {
            foot: start,
            chainage: 0.0,
            offset: 0.0,
            distance: (point.x - start.x).hypot(point.y - start.y),
        })
    })
}
