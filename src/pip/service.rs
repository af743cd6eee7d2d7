//! Depot resolution: which depot is responsible for a point.

use std::sync::Arc;
use tracing::debug;

use super::CatchmentIndex;
use crate::catchment::Extent;
use crate::models::DepotCatchment;

/// Point-in-catchment lookup service
pub struct DepotResolver {
    index: CatchmentIndex,
    extent: Option<Extent>,
}

impl DepotResolver {
    /// Create a new resolver from a catchment index
    pub fn new(index: CatchmentIndex) -> Self {
        Self {
            index,
            extent: None,
        }
    }

    /// Build the index and resolver in one step
    pub fn from_catchments(catchments: Vec<DepotCatchment>) -> Self {
        Self::new(CatchmentIndex::build(catchments))
    }

    /// Treat the catchments as a tessellation of `extent`: any point inside
    /// it resolves, even where separately clipped cells leave a rounding
    /// sliver between them.
    pub fn with_extent(mut self, extent: Extent) -> Self {
        self.extent = Some(extent);
        self
    }

    /// Responsible depot for a point, or None outside every catchment.
    ///
    /// On a shared boundary the depot whose site is nearest wins, then the
    /// smallest depot id. Inside the extent, a point no cell contains goes
    /// to the nearest depot site by the same rule.
    pub fn resolve(&self, x: f64, y: f64) -> Option<Arc<DepotCatchment>> {
        let candidates = self.index.lookup(x, y);

        if candidates.is_empty() {
            let in_extent = self.extent.map_or(false, |e| e.contains(x, y));
            if !in_extent {
                return None;
            }
            debug!("Point ({}, {}) falls between catchments, using nearest site", x, y);
            return nearest(self.index.catchments().cloned(), x, y);
        }

        if candidates.len() > 1 {
            debug!(
                "Point ({}, {}) touches {} catchments, applying tie-break",
                x,
                y,
                candidates.len()
            );
        }

        nearest(candidates, x, y)
    }

    /// Responsible depot id for a point
    pub fn resolve_id(&self, x: f64, y: f64) -> Option<String> {
        self.resolve(x, y).map(|c| c.depot_id().to_string())
    }

    /// Get the spatial index (for stats/debugging)
    pub fn index(&self) -> &CatchmentIndex {
        &self.index
    }
}

fn nearest<I>(catchments: I, x: f64, y: f64) -> Option<Arc<DepotCatchment>>
where
    I: IntoIterator<Item = Arc<DepotCatchment>>,
{
    catchments.into_iter().min_by(|a, b| {
        let da = site_distance(a, x, y);
        let db = site_distance(b, x, y);
        da.total_cmp(&db)
            .then_with(|| a.depot_id().cmp(b.depot_id()))
    })
}

fn site_distance(catchment: &DepotCatchment, x: f64, y: f64) -> f64 {
    (catchment.depot.easting - x).hypot(catchment.depot.northing - y)
}
