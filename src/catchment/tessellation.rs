//! Nearest-depot (Thiessen) tessellation over an extent.
//!
//! Each cell starts as the extent rectangle and is cut down by the
//! perpendicular bisector between its depot and every other depot. The
//! result is convex and the cells abut along shared bisectors.

use geo::{Coord, LineString, Polygon};
use tracing::{debug, info, warn};

use super::Extent;
use crate::models::{Depot, DepotCatchment};

/// Build one catchment per depot, clipped to `extent`.
///
/// Depots whose cell does not reach into the extent get no catchment.
/// Coincident depots are not deduplicated.
pub fn build_catchments(depots: &[Depot], extent: &Extent) -> Vec<DepotCatchment> {
    info!(
        "Building catchments for {} depots over extent ({:.0}, {:.0}) - ({:.0}, {:.0})",
        depots.len(),
        extent.min_x,
        extent.min_y,
        extent.max_x,
        extent.max_y
    );

    let sites: Vec<Coord<f64>> = depots.iter().map(Depot::site).collect();

    let mut catchments = Vec::with_capacity(depots.len());
    for (i, depot) in depots.iter().enumerate() {
        match nearest_depot_cell(i, &sites, extent) {
            Some(boundary) => {
                debug!(
                    "Catchment for {} has {} vertices",
                    depot.depot_id,
                    boundary.exterior().0.len()
                );
                catchments.push(DepotCatchment {
                    depot: depot.clone(),
                    boundary,
                });
            }
            None => warn!(
                "Depot {} has no catchment inside the extent",
                depot.depot_id
            ),
        }
    }

    info!("Built {} depot catchments", catchments.len());
    catchments
}

/// Cell of `sites[index]` within the extent, or None if it is empty
pub fn nearest_depot_cell(
    index: usize,
    sites: &[Coord<f64>],
    extent: &Extent,
) -> Option<Polygon<f64>> {
    let site = *sites.get(index)?;
    let mut cell = extent.corners();

    for (j, other) in sites.iter().enumerate() {
        if j == index {
            continue;
        }
        cell = clip_to_nearer_half(&cell, site, *other);
        if cell.len() < 3 {
            return None;
        }
    }

    let mut ring = cell;
    ring.push(ring[0]);
    Some(Polygon::new(LineString::new(ring), vec![]))
}

/// Keep the part of a convex polygon at least as close to `site` as to `other`
/// (Sutherland-Hodgman against the bisector half-plane).
fn clip_to_nearer_half(
    polygon: &[Coord<f64>],
    site: Coord<f64>,
    other: Coord<f64>,
) -> Vec<Coord<f64>> {
    let normal = other - site;
    let limit = (normal.x * normal.x + normal.y * normal.y) / 2.0;
    // Signed distance (scaled) past the bisector; <= 0 is on the site's side.
    let side = |c: Coord<f64>| {
        let rel = c - site;
        normal.x * rel.x + normal.y * rel.y - limit
    };

    let mut out = Vec::with_capacity(polygon.len() + 1);
    for (k, &current) in polygon.iter().enumerate() {
        let previous = polygon[(k + polygon.len() - 1) % polygon.len()];
        let d_cur = side(current);
        let d_prev = side(previous);

        if d_cur <= 0.0 {
            if d_prev > 0.0 {
                out.push(crossing(previous, current, d_prev, d_cur));
            }
            out.push(current);
        } else if d_prev <= 0.0 {
            out.push(crossing(previous, current, d_prev, d_cur));
        }
    }

    out.dedup();
    if out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

fn crossing(a: Coord<f64>, b: Coord<f64>, d_a: f64, d_b: f64) -> Coord<f64> {
    let t = d_a / (d_a - d_b);
    a + (b - a) * t
}
