//! Secondary inspection-detail rows, linked one-to-many to defects.

/// One inspection row. Columns besides the defect key are carried verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct InspectionRecord {
    pub defect_id: String,
    pub attributes: Vec<(String, String)>,
}
