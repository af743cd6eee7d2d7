//! Core data models for the defect location pipeline.

pub mod defect;
pub mod depot;
pub mod inspection;
pub mod network;

pub use defect::{columns, display_label, DefectRecord, DefectStatus, RouteLocation};
pub use depot::{Depot, DepotCatchment};
pub use inspection::InspectionRecord;
pub use network::{LaneCount, NetworkSegment};
