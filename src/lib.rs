//! Linref - depot assignment and linear referencing for highway defects
//!
//! This library provides the catchment, point-in-polygon, route location and
//! lane classification stages used by the `locate` binary.

pub mod catchment;
pub mod config;
pub mod error;
pub mod models;
pub mod pip;
pub mod pipeline;
pub mod route;
pub mod store;
pub mod xsp;

pub use error::{LocateError, Result};
pub use models::{DefectRecord, Depot, DepotCatchment, LaneCount, NetworkSegment};
pub use xsp::{classify, LanePosition};
