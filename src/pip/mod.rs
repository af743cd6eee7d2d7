//! Point-in-Polygon (PIP) depot lookup.
//!
//! Indexes depot catchments in an R-tree and resolves the responsible
//! depot for a point.

mod index;
mod service;

pub use index::{CatchmentIndex, IndexedCatchment};
pub use service::DepotResolver;
