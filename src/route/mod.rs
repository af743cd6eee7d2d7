//! Route location: projects points onto the reference network to give a
//! section, chainage and signed offset.

mod index;
mod locator;
mod projection;

pub use index::{IndexedSegment, SegmentIndex};
pub use locator::{RouteLocator, RouteMatch, DEFAULT_SEARCH_RADIUS};
pub use projection::{project, Projection};
