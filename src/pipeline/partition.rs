use std::collections::BTreeMap;

use crate::models::DefectRecord;

/// Enriched defects grouped by responsible depot, keyed in depot order.
/// Defects without a depot belong to no partition.
pub fn partition_by_depot(records: &[DefectRecord]) -> BTreeMap<String, Vec<DefectRecord>> {
    let mut partitions: BTreeMap<String, Vec<DefectRecord>> = BTreeMap::new();
    for record in records {
        if let Some(depot) = record.responsible_depot.as_deref().filter(|d| !d.is_empty()) {
            partitions
                .entry(depot.to_string())
                .or_default()
                .push(record.clone());
        }
    }
    partitions
}

/// File-safe name for a depot's partition ("South Cave" -> "South_Cave")
pub fn partition_name(depot_id: &str) -> String {
    depot_id
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
