//! Spatial index for fast catchment lookups.

use geo::{Intersects, Point};
use rstar::{RTree, RTreeObject, AABB};
use std::sync::Arc;
use tracing::info;

use crate::models::DepotCatchment;

/// Wrapper for R-tree indexing of catchments
#[derive(Clone)]
pub struct IndexedCatchment {
    pub catchment: Arc<DepotCatchment>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedCatchment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedCatchment {
    pub fn new(catchment: DepotCatchment) -> Option<Self> {
        let (min_x, min_y, max_x, max_y) = catchment.bbox()?;
        Some(Self {
            catchment: Arc::new(catchment),
            envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
        })
    }
}

/// Spatial index for depot catchments using R-tree
pub struct CatchmentIndex {
    tree: RTree<IndexedCatchment>,
}

impl CatchmentIndex {
    /// Build spatial index from catchments
    pub fn build(catchments: Vec<DepotCatchment>) -> Self {
        info!("Building spatial index for {} catchments...", catchments.len());

        let indexed: Vec<IndexedCatchment> = catchments
            .into_iter()
            .filter_map(IndexedCatchment::new)
            .collect();

        let tree = RTree::bulk_load(indexed);
        info!("Spatial index built with {} entries", tree.size());

        Self { tree }
    }

    /// Find all catchments touching a point. A point on a shared edge or
    /// corner is returned by every catchment meeting there.
    pub fn lookup(&self, x: f64, y: f64) -> Vec<Arc<DepotCatchment>> {
        let point = Point::new(x, y);
        let query_envelope = AABB::from_point([x, y]);

        // Envelope candidates first, then the exact boundary-inclusive test
        self.tree
            .locate_in_envelope_intersecting(&query_envelope)
            .filter(|ic| ic.catchment.boundary.intersects(&point))
            .map(|ic| Arc::clone(&ic.catchment))
            .collect()
    }

    /// Every indexed catchment, in no particular order
    pub fn catchments(&self) -> impl Iterator<Item = &Arc<DepotCatchment>> {
        self.tree.iter().map(|ic| &ic.catchment)
    }

    /// Get total number of indexed catchments
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
