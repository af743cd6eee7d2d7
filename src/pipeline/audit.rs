//! Completeness audit over enriched defects.

use chrono::{DateTime, Utc};
use hashbrown::HashSet;
use serde::Serialize;
use std::fmt;

use crate::models::{columns, DefectRecord, InspectionRecord};

/// Derived fields every active defect should end up with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DerivedField {
    ResponsibleDepot,
    Section,
    Chainage,
    LanePosition,
}

impl DerivedField {
    pub fn all() -> &'static [DerivedField] {
        &[
            DerivedField::ResponsibleDepot,
            DerivedField::Section,
            DerivedField::Chainage,
            DerivedField::LanePosition,
        ]
    }

    pub fn column(&self) -> &'static str {
        match self {
            DerivedField::ResponsibleDepot => columns::RESPONSIBLE_DEPOT,
            DerivedField::Section => columns::SECTION,
            DerivedField::Chainage => columns::CHAINAGE,
            DerivedField::LanePosition => columns::XSP,
        }
    }

    fn is_missing(&self, record: &DefectRecord) -> bool {
        match self {
            DerivedField::ResponsibleDepot => record
                .responsible_depot
                .as_deref()
                .map_or(true, |d| d.trim().is_empty()),
            DerivedField::Section => record.section().map_or(true, |s| s.trim().is_empty()),
            DerivedField::Chainage => record.chainage().map_or(true, |c| !c.is_finite()),
            DerivedField::LanePosition => record.lane_position.is_none(),
        }
    }
}

/// Why a defect is missing a derived value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Anomaly {
    /// Outside every depot catchment
    UnresolvedAssignment,
    /// No section within the search radius
    UnlocatedPoint,
    /// No offset to classify
    ClassificationSkipped,
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::UnresolvedAssignment => write!(f, "outside all depot catchments"),
            Anomaly::UnlocatedPoint => write!(f, "no section within search radius"),
            Anomaly::ClassificationSkipped => write!(f, "lane position not classified"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordAnomaly {
    pub defect_id: String,
    pub anomaly: Anomaly,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissingField {
    pub field: &'static str,
    pub defect_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub generated_at: DateTime<Utc>,
    pub active_records: usize,
    /// Records with at least one missing derived field
    pub incomplete_records: usize,
    pub missing: Vec<MissingField>,
    pub anomalies: Vec<RecordAnomaly>,
    /// Inspection rows whose defect is not among the active records
    pub orphaned_inspections: Vec<String>,
}

impl AuditReport {
    pub fn is_complete(&self) -> bool {
        self.incomplete_records == 0
    }

    pub fn missing_count(&self, column: &str) -> usize {
        self.missing
            .iter()
            .find(|m| m.field == column)
            .map_or(0, |m| m.defect_ids.len())
    }

    pub fn anomaly_count(&self, anomaly: Anomaly) -> usize {
        self.anomalies.iter().filter(|a| a.anomaly == anomaly).count()
    }
}

/// Why a record came out incomplete, in pipeline order
pub fn anomalies_for(record: &DefectRecord) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();
    if record.responsible_depot.is_none() {
        anomalies.push(Anomaly::UnresolvedAssignment);
    }
    if record.location.is_none() {
        anomalies.push(Anomaly::UnlocatedPoint);
    }
    if record.lane_position.is_none() {
        anomalies.push(Anomaly::ClassificationSkipped);
    }
    anomalies
}

/// Scan every record for missing derived fields. Never fails: gaps are
/// reported, not raised.
pub fn audit(records: &[DefectRecord], inspections: &[InspectionRecord]) -> AuditReport {
    let missing: Vec<MissingField> = DerivedField::all()
        .iter()
        .map(|field| MissingField {
            field: field.column(),
            defect_ids: records
                .iter()
                .filter(|r| field.is_missing(r))
                .map(|r| r.defect_id.clone())
                .collect(),
        })
        .collect();

    let incomplete_records = records
        .iter()
        .filter(|r| DerivedField::all().iter().any(|f| f.is_missing(r)))
        .count();

    let anomalies = records
        .iter()
        .flat_map(|r| {
            anomalies_for(r).into_iter().map(|anomaly| RecordAnomaly {
                defect_id: r.defect_id.clone(),
                anomaly,
            })
        })
        .collect();

    let known: HashSet<&str> = records.iter().map(|r| r.defect_id.as_str()).collect();
    let mut orphaned_inspections: Vec<String> = inspections
        .iter()
        .filter(|i| !known.contains(i.defect_id.as_str()))
        .map(|i| i.defect_id.clone())
        .collect();
    orphaned_inspections.sort();
    orphaned_inspections.dedup();

    AuditReport {
        generated_at: Utc::now(),
        active_records: records.len(),
        incomplete_records,
        missing,
        anomalies,
        orphaned_inspections,
    }
}
