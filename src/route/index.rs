//! R-tree over network sections for nearest-section queries.

use rstar::{RTree, RTreeObject, AABB};
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::NetworkSegment;

/// Section wrapped with its spatial envelope
#[derive(Clone, Debug)]
pub struct IndexedSegment {
    pub segment: Arc<NetworkSegment>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedSegment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedSegment {
    pub fn new(segment: NetworkSegment) -> Option<Self> {
        let (min_x, min_y, max_x, max_y) = segment.bbox()?;
        Some(Self {
            segment: Arc::new(segment),
            envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
        })
    }
}

/// Spatial index of the reference network
pub struct SegmentIndex {
    tree: RTree<IndexedSegment>,
}

impl SegmentIndex {
    pub fn build(segments: Vec<NetworkSegment>) -> Self {
        info!("Indexing {} network sections...", segments.len());

        let indexed: Vec<IndexedSegment> = segments
            .into_iter()
            .filter_map(|segment| {
                let id = segment.section_id.clone();
                let indexed = IndexedSegment::new(segment);
                if indexed.is_none() {
                    warn!("Section {} has no geometry, skipping", id);
                }
                indexed
            })
            .collect();

        let tree = RTree::bulk_load(indexed);
        info!("Network index built with {} sections", tree.size());

        Self { tree }
    }

    /// Sections whose envelope comes within `radius` of the point
    pub fn candidates(
        &self,
        x: f64,
        y: f64,
        radius: f64,
    ) -> impl Iterator<Item = &Arc<NetworkSegment>> {
        let envelope = AABB::from_corners([x - radius, y - radius], [x + radius, y + radius]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|is| &is.segment)
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    pub fn segments(&self) -> impl Iterator<Item = &Arc<NetworkSegment>> {
        self.tree.iter().map(|is| &is.segment)
    }
}
