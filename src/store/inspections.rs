//! Secondary inspection table (one-to-many on Defect_Id).

use csv::Writer;
use std::path::Path;
use tracing::info;

use super::table::Table;
use crate::error::{LocateError, Result};
use crate::models::{columns, display_label, InspectionRecord};

const KIND: &str = "inspections";

pub fn read_inspections(path: &Path) -> Result<Vec<InspectionRecord>> {
    info!("Loading inspections from {}", path.display());

    let table = Table::read(path, KIND)?;
    let id_idx = table.column(KIND, columns::DEFECT_ID)?;

    let inspections = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let defect_id = row.get(id_idx).unwrap_or_default();
            if defect_id.is_empty() {
                return Err(LocateError::InvalidRow {
                    kind: KIND,
                    row: i + 2,
                    reason: "empty Defect_Id".to_string(),
                });
            }
            Ok(InspectionRecord {
                defect_id: defect_id.to_string(),
                attributes: table.source_attributes(row),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!("Loaded {} inspection rows", inspections.len());
    Ok(inspections)
}

/// Write inspections with their display label appended
pub fn write_inspections(
    path: &Path,
    inspections: &[InspectionRecord],
    label_prefix: &str,
) -> Result<()> {
    let mut writer = Writer::from_path(path)?;

    let mut header: Vec<&str> = inspections
        .first()
        .map(|r| r.attributes.iter().map(|(name, _)| name.as_str()).collect())
        .unwrap_or_else(|| vec![columns::DEFECT_ID]);
    header.push(columns::DISPLAY_NAME);
    writer.write_record(&header)?;

    for inspection in inspections {
        let mut row: Vec<String> = inspection.attributes.iter().map(|(_, v)| v.clone()).collect();
        row.push(display_label(label_prefix, &inspection.defect_id));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_read_and_label_inspections() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("de02.csv");
        fs::write(
            &input,
            "Defect_Id,Inspected,Display_Name\n101,2024-01-02,de02: 101\n101,2024-02-03,\n205,2024-03-04,\n",
        )
        .unwrap();

        let inspections = read_inspections(&input).unwrap();
        assert_eq!(inspections.len(), 3);
        assert_eq!(inspections[1].defect_id, "101");
        assert_eq!(inspections[0].attributes.len(), 2);

        let output = dir.path().join("inspections.csv");
        write_inspections(&output, &inspections, "de02").unwrap();
        let written = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "Defect_Id,Inspected,Display_Name");
        assert_eq!(lines[1], "101,2024-01-02,de02: 101");
        assert_eq!(lines[3], "205,2024-03-04,de02: 205");
    }
}
