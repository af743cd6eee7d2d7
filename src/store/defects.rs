//! Defect report import and enriched export.

use csv::Writer;
use std::path::Path;
use tracing::info;

use super::table::Table;
use crate::error::{LocateError, Result};
use crate::models::{columns, DefectRecord, DefectStatus};

const KIND: &str = "defects";

/// Read the defect report. Every row is returned, active or not.
pub fn read_defects(path: &Path) -> Result<Vec<DefectRecord>> {
    info!("Loading defects from {}", path.display());

    let table = Table::read(path, KIND)?;
    let id_idx = table.column(KIND, columns::DEFECT_ID)?;
    let status_idx = table.column(KIND, columns::STATUS)?;
    let easting_idx = table.column(KIND, columns::EASTING)?;
    let northing_idx = table.column(KIND, columns::NORTHING)?;

    let mut defects = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        // Header is line 1
        let line = i + 2;
        let defect_id = row.get(id_idx).unwrap_or_default();
        if defect_id.is_empty() {
            return Err(invalid(line, "empty Defect_Id".to_string()));
        }
        let easting = parse_coordinate(row.get(easting_idx), line, columns::EASTING)?;
        let northing = parse_coordinate(row.get(northing_idx), line, columns::NORTHING)?;
        let status = row.get(status_idx).unwrap_or_default();

        defects.push(DefectRecord {
            defect_id: defect_id.to_string(),
            status: DefectStatus::parse(status),
            easting,
            northing,
            attributes: table.source_attributes(row),
            responsible_depot: None,
            location: None,
            lane_position: None,
            inspection_count: 0,
        });
    }

    if defects.is_empty() {
        return Err(LocateError::EmptyInput(KIND));
    }

    info!("Loaded {} defects", defects.len());
    Ok(defects)
}

fn parse_coordinate(value: Option<&str>, line: usize, column: &str) -> Result<f64> {
    let value = value.unwrap_or_default();
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(line, format!("{} '{}' is not a number", column, value)))
}

fn invalid(row: usize, reason: String) -> LocateError {
    LocateError::InvalidRow {
        kind: KIND,
        row,
        reason,
    }
}

/// Write enriched defects: source columns followed by the derived ones.
/// Missing derived values are written as empty cells.
pub fn write_defects(path: &Path, records: &[DefectRecord], label_prefix: &str) -> Result<()> {
    let mut writer = Writer::from_path(path)?;

    let mut header: Vec<&str> = records
        .first()
        .map(|r| r.attributes.iter().map(|(name, _)| name.as_str()).collect())
        .unwrap_or_else(|| {
            vec![
                columns::DEFECT_ID,
                columns::STATUS,
                columns::EASTING,
                columns::NORTHING,
            ]
        });
    header.extend([
        columns::RESPONSIBLE_DEPOT,
        columns::SECTION,
        columns::CHAINAGE,
        columns::XSP,
        columns::DISPLAY_NAME,
        columns::INSPECTION_COUNT,
    ]);
    writer.write_record(&header)?;

    for record in records {
        let mut row: Vec<String> = record.attributes.iter().map(|(_, v)| v.clone()).collect();
        row.push(record.responsible_depot.clone().unwrap_or_default());
        row.push(record.section().unwrap_or_default().to_string());
        row.push(record.chainage().map(format_chainage).unwrap_or_default());
        row.push(record.lane_position.map(|p| p.label().to_string()).unwrap_or_default());
        row.push(record.display_name(label_prefix));
        row.push(record.inspection_count.to_string());
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

fn format_chainage(chainage: f64) -> String {
    format!("{:.3}", chainage)
}
