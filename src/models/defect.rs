//! Defect records and their derived location attributes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::xsp::LanePosition;

/// Column names of the defect report
pub mod columns {
    pub const DEFECT_ID: &str = "Defect_Id";
    pub const STATUS: &str = "Defect_Status";
    pub const EASTING: &str = "Easting";
    pub const NORTHING: &str = "Northing";

    pub const RESPONSIBLE_DEPOT: &str = "Responsible_Depot";
    pub const SECTION: &str = "Section";
    pub const CHAINAGE: &str = "Chainage";
    pub const OFFSET: &str = "Offset";
    pub const XSP: &str = "XSP";
    pub const DISPLAY_NAME: &str = "Display_Name";
    pub const INSPECTION_COUNT: &str = "Inspection_Count";

    /// Columns the pipeline writes. Dropped from input so a rerun over
    /// earlier output starts clean.
    pub const DERIVED: [&str; 7] = [
        RESPONSIBLE_DEPOT,
        SECTION,
        CHAINAGE,
        OFFSET,
        XSP,
        DISPLAY_NAME,
        INSPECTION_COUNT,
    ];

    pub fn is_derived(name: &str) -> bool {
        DERIVED.iter().any(|d| d.eq_ignore_ascii_case(name.trim()))
    }
}

/// Lifecycle state of a defect report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DefectStatus {
    Active,
    Completed,
    Superseded,
}

impl DefectStatus {
    /// Map the report's status text. Anything that is not completed or
    /// superseded is still outstanding.
    pub fn parse(status: &str) -> Self {
        let status = status.trim();
        if status.eq_ignore_ascii_case("completed") {
            DefectStatus::Completed
        } else if status.eq_ignore_ascii_case("superseded") {
            DefectStatus::Superseded
        } else {
            DefectStatus::Active
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, DefectStatus::Active)
    }
}

/// Linear reference of a point on the network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLocation {
    /// Matched section identifier
    pub section: String,
    /// Distance along the section from its start, in the direction of travel
    pub chainage: f64,
    /// Signed perpendicular distance from the centreline (positive = nearside)
    pub offset: f64,
    /// Unsigned distance from the point to its projection
    pub distance: f64,
}

/// One defect report row.
///
/// Every source column, including the ones parsed into typed fields, is
/// kept verbatim in `attributes` in source column order and written back out.
#[derive(Debug, Clone, PartialEq)]
pub struct DefectRecord {
    pub defect_id: String,
    pub status: DefectStatus,
    pub easting: f64,
    pub northing: f64,
    pub attributes: Vec<(String, String)>,

    pub responsible_depot: Option<String>,
    pub location: Option<RouteLocation>,
    pub lane_position: Option<LanePosition>,
    pub inspection_count: usize,
}

impl DefectRecord {
    pub fn new(defect_id: impl Into<String>, status: &str, easting: f64, northing: f64) -> Self {
        let defect_id = defect_id.into();
        let attributes = vec![
            (columns::DEFECT_ID.to_string(), defect_id.clone()),
            (columns::STATUS.to_string(), status.to_string()),
            (columns::EASTING.to_string(), easting.to_string()),
            (columns::NORTHING.to_string(), northing.to_string()),
        ];
        Self {
            defect_id,
            status: DefectStatus::parse(status),
            easting,
            northing,
            attributes,
            responsible_depot: None,
            location: None,
            lane_position: None,
            inspection_count: 0,
        }
    }

    pub fn section(&self) -> Option<&str> {
        self.location.as_ref().map(|l| l.section.as_str())
    }

    pub fn chainage(&self) -> Option<f64> {
        self.location.as_ref().map(|l| l.chainage)
    }

    pub fn offset(&self) -> Option<f64> {
        self.location.as_ref().map(|l| l.offset)
    }

    /// Label shown when the record is inspected, e.g. "de05: 1234"
    pub fn display_name(&self, prefix: &str) -> String {
        display_label(prefix, &self.defect_id)
    }

    /// Drop everything the pipeline derives so the record can be enriched again
    pub fn clear_derived(&mut self) {
        self.responsible_depot = None;
        self.location = None;
        self.lane_position = None;
        self.inspection_count = 0;
    }
}

impl fmt::Display for DefectRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1}, {:.1})", self.defect_id, self.easting, self.northing)
    }
}

pub fn display_label(prefix: &str, defect_id: &str) -> String {
    format!("{}: {}", prefix, defect_id)
}
