//! Linear referencing of points against the network.

use geo::Coord;
use std::sync::Arc;
use tracing::debug;

use super::{project, Projection, SegmentIndex};
use crate::models::{NetworkSegment, RouteLocation};

/// Default maximum distance between a point and its matched section
pub const DEFAULT_SEARCH_RADIUS: f64 = 50.0;

/// A point matched to a section
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub segment: Arc<NetworkSegment>,
    pub projection: Projection,
}

impl RouteMatch {
    pub fn to_location(&self) -> RouteLocation {
        RouteLocation {
            section: self.segment.section_id.clone(),
            chainage: self.projection.chainage,
            offset: self.projection.offset,
            distance: self.projection.distance,
        }
    }
}

/// Finds the nearest section within a search radius
pub struct RouteLocator {
    index: SegmentIndex,
    search_radius: f64,
}

impl RouteLocator {
    pub fn new(index: SegmentIndex, search_radius: f64) -> Self {
        Self {
            index,
            search_radius,
        }
    }

    pub fn from_segments(segments: Vec<NetworkSegment>, search_radius: f64) -> Self {
        Self::new(SegmentIndex::build(segments), search_radius)
    }

    pub fn search_radius(&self) -> f64 {
        self.search_radius
    }

    /// Nearest section to the point, or None if every section is further
    /// than the search radius. Equidistant sections go to the smallest
    /// section id.
    pub fn locate(&self, x: f64, y: f64) -> Option<RouteMatch> {
        let point = Coord { x, y };

        let best = self
            .index
            .candidates(x, y, self.search_radius)
            .filter_map(|segment| {
                let projection = project(&segment.geometry, point)?;
                (projection.distance <= self.search_radius).then(|| RouteMatch {
                    segment: Arc::clone(segment),
                    projection,
                })
            })
            .min_by(|a, b| {
                a.projection
                    .distance
                    .total_cmp(&b.projection.distance)
                    .then_with(|| a.segment.section_id.cmp(&b.segment.section_id))
            });

        if best.is_none() {
            debug!(
                "No section within {} of ({}, {})",
                self.search_radius, x, y
            );
        }

        best
    }

    /// Look up a section by id
    pub fn segment(&self, section_id: &str) -> Option<&Arc<NetworkSegment>> {
        self.index
            .segments()
            .find(|segment| segment.section_id == section_id)
    }

    pub fn index(&self) -> &SegmentIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LaneCount;
    use geo::{LineString, MultiLineString};

    fn section(id: &str, coords: Vec<(f64, f64)>, lanes: LaneCount) -> NetworkSegment {
        NetworkSegment::new(id, MultiLineString::new(vec![LineString::from(coords)]), lanes)
    }

    fn locator() -> RouteLocator {
        RouteLocator::from_segments(
            vec![
                section("M62/200", vec![(0.0, 0.0), (1000.0, 0.0)], LaneCount::Three),
                section("M1/110", vec![(500.0, -500.0), (500.0, -100.0)], LaneCount::Two),
            ],
            DEFAULT_SEARCH_RADIUS,
        )
    }

    #[test]
    fn test_match_within_radius() {
        let m = locator().locate(250.0, 12.0).unwrap();
        assert_eq!(m.segment.section_id, "M62/200");
        assert_eq!(m.projection.chainage, 250.0);
        assert_eq!(m.projection.offset, 12.0);
        assert_eq!(m.segment.lane_count, LaneCount::Three);
    }

    #[test]
    fn test_radius_is_inclusive() {
        let locator = locator();
        assert!(locator.locate(250.0, 50.0).is_some());
        assert!(locator.locate(250.0, 50.001).is_none());
        // Past the end of a section the distance is measured to the end point
        assert!(locator.locate(1040.0, 30.0).is_some());
        assert!(locator.locate(1040.0, 31.0).is_none());
    }

    #[test]
    fn test_nearest_section_wins() {
        let m = locator().locate(510.0, -120.0).unwrap();
        assert_eq!(m.segment.section_id, "M1/110");
        assert_eq!(m.projection.chainage, 380.0);
        assert_eq!(m.projection.offset, -10.0);
    }

    #[test]
    fn test_equidistant_tie_goes_to_smallest_id() {
        let locator = RouteLocator::from_segments(
            vec![
                section("B", vec![(0.0, 10.0), (100.0, 10.0)], LaneCount::Two),
                section("A", vec![(100.0, -10.0), (0.0, -10.0)], LaneCount::Two),
            ],
            DEFAULT_SEARCH_RADIUS,
        );
        for _ in 0..5 {
            let m = locator.locate(50.0, 0.0).unwrap();
            assert_eq!(m.segment.section_id, "A");
        }
    }

    #[test]
    fn test_chainage_stays_on_section() {
        let locator = locator();
        for (x, y) in [(-20.0, 5.0), (0.0, 0.0), (999.0, -3.0), (1020.0, 0.0)] {
            let m = locator.locate(x, y).unwrap();
            let length = m.segment.length();
            assert!(m.projection.chainage >= 0.0);
            assert!(m.projection.chainage <= length);
            assert!(m.projection.distance <= locator.search_radius());
        }
    }

    #[test]
    fn test_beyond_section_end_is_off_carriageway() {
        let locator = locator();
        let on_axis = locator.locate(1040.0, 0.0).unwrap();
        assert_eq!(on_axis.projection.distance, 40.0);
        assert_eq!(on_axis.projection.offset, 40.0);
        assert_eq!(
            crate::xsp::classify(on_axis.projection.offset, on_axis.segment.lane_count),
            crate::xsp::LanePosition::OffCarriageway
        );
    }

    #[test]
    fn test_segment_lookup() {
        let locator = locator();
        assert_eq!(locator.segment("M1/110").unwrap().lane_count, LaneCount::Two);
        assert!(locator.segment("A1/000").is_none());
        assert_eq!(locator.index().len(), 2);
    }
}
