//! Depot catchment construction.
//!
//! Partitions a bounding extent into one convex cell per depot, each cell
//! holding the locations nearer to its depot than to any other.

mod extent;
mod tessellation;

pub use extent::Extent;
pub use tessellation::{build_catchments, nearest_depot_cell};
