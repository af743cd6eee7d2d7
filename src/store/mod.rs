//! Reference-data store: reads pipeline inputs and writes its outputs.
//!
//! A [`Workspace`] names every input and the output directory explicitly,
//! so runs against different datasets never share state.

mod catchments;
mod defects;
mod depots;
mod inspections;
mod network;
mod table;

pub use catchments::{catchments_to_geojson, write_catchments};
pub use defects::{read_defects, write_defects};
pub use depots::read_depots;
pub use inspections::{read_inspections, write_inspections};
pub use network::{parse_network, read_network};

use hashbrown::HashSet;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{Config, FieldsConfig, InputsConfig};
use crate::error::Result;
use crate::models::{DefectRecord, Depot, DepotCatchment, InspectionRecord, NetworkSegment};
use crate::pipeline::{partition_name, AuditReport};

pub const ENRICHED_FILE: &str = "defects_enriched.csv";
pub const PARTITION_DIR: &str = "by_depot";
pub const PARTITION_SUFFIX: &str = "_Defects.csv";
pub const CATCHMENTS_FILE: &str = "catchments.geojson";
pub const INSPECTIONS_FILE: &str = "inspections.csv";
pub const AUDIT_FILE: &str = "audit.json";

pub struct Workspace {
    inputs: InputsConfig,
    output_dir: PathBuf,
    fields: FieldsConfig,
}

impl Workspace {
    pub fn new(inputs: InputsConfig, output_dir: impl Into<PathBuf>, fields: FieldsConfig) -> Self {
        Self {
            inputs,
            output_dir: output_dir.into(),
            fields,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.inputs.clone(),
            config.output.dir.clone(),
            config.fields.clone(),
        )
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn load_defects(&self) -> Result<Vec<DefectRecord>> {
        read_defects(&self.inputs.defects)
    }

    pub fn load_depots(&self) -> Result<Vec<Depot>> {
        read_depots(&self.inputs.depots)
    }

    pub fn load_network(&self) -> Result<Vec<NetworkSegment>> {
        read_network(&self.inputs.network, &self.fields)
    }

    /// Inspection rows, or none when no inspection table is configured
    pub fn load_inspections(&self) -> Result<Vec<InspectionRecord>> {
        match &self.inputs.inspections {
            Some(path) => read_inspections(path),
            None => Ok(Vec::new()),
        }
    }

    /// Create the output directory and remove partition files left by an
    /// earlier run
    pub fn prepare_output(&self) -> Result<()> {
        let partition_dir = self.output_dir.join(PARTITION_DIR);
        fs::create_dir_all(&partition_dir)?;

        for entry in fs::read_dir(&partition_dir)? {
            let path = entry?.path();
            let stale = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.ends_with(PARTITION_SUFFIX));
            if stale && path.is_file() {
                debug!("Removing superseded output {}", path.display());
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    pub fn write_enriched(&self, records: &[DefectRecord]) -> Result<PathBuf> {
        let path = self.output_dir.join(ENRICHED_FILE);
        write_defects(&path, records, &self.fields.defect_label_prefix)?;
        info!("Wrote {} enriched defects to {}", records.len(), path.display());
        Ok(path)
    }

    /// One file per depot, named after it. Depot ids that sanitise to the
    /// same name get a numeric suffix, in depot order.
    pub fn write_partitions(
        &self,
        partitions: &BTreeMap<String, Vec<DefectRecord>>,
    ) -> Result<Vec<PathBuf>> {
        let dir = self.output_dir.join(PARTITION_DIR);
        let mut written = Vec::with_capacity(partitions.len());
        // Lowercased so case-insensitive filesystems cannot merge files either
        let mut taken: HashSet<String> = HashSet::with_capacity(partitions.len());
        for (depot, records) in partitions {
            let base = partition_name(depot);
            let mut name = base.clone();
            let mut n = 2;
            while !taken.insert(name.to_lowercase()) {
                name = format!("{}_{}", base, n);
                n += 1;
            }
            if name != base {
                warn!("Depot '{}' shares the file name {}; writing it as {}", depot, base, name);
            }
            let path = dir.join(format!("{}{}", name, PARTITION_SUFFIX));
            info!("Exporting {} defects for {} to {}", records.len(), depot, path.display());
            write_defects(&path, records, &self.fields.defect_label_prefix)?;
            written.push(path);
        }
        Ok(written)
    }

    pub fn write_catchments(&self, catchments: &[DepotCatchment]) -> Result<PathBuf> {
        let path = self.output_dir.join(CATCHMENTS_FILE);
        write_catchments(&path, catchments)?;
        Ok(path)
    }

    pub fn write_inspections(&self, inspections: &[InspectionRecord]) -> Result<PathBuf> {
        let path = self.output_dir.join(INSPECTIONS_FILE);
        write_inspections(&path, inspections, &self.fields.inspection_label_prefix)?;
        Ok(path)
    }

    pub fn write_audit(&self, report: &AuditReport) -> Result<PathBuf> {
        let path = self.output_dir.join(AUDIT_FILE);
        fs::write(&path, serde_json::to_string_pretty(report)?)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catchment::Extent;
    use crate::pipeline::{Pipeline, PipelineSettings};

    const DEFECTS: &str = "\
Defect_Id,Defect_Status,Easting,Northing,Priority
1,OUTSTANDING,800,1002,P1
2,INSTRUCTED,3008,1200,P2
3,COMPLETED,800,1002,P3
4,OUTSTANDING,-10,1000,P1
";

    const DEPOTS: &str = "DEPOT,Easting,Northing\nSouth Cave,1000,1000\nWest Cowick,3000,1000\n";

    const NETWORK: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"FEATURE_LA":"M62/100","No_of_Lane":"2L"},
         "geometry":{"type":"LineString","coordinates":[[500,1000],[1500,1000]]}},
        {"type":"Feature","properties":{"FEATURE_LA":"M18/300","No_of_Lane":"4L"},
         "geometry":{"type":"LineString","coordinates":[[3000,500],[3000,1500]]}}
    ]}"#;

    const INSPECTIONS: &str = "Defect_Id,Inspector\n1,JB\n1,KL\n9,MM\n";

    fn workspace(dir: &Path) -> Workspace {
        fs::write(dir.join("de05.csv"), DEFECTS).unwrap();
        fs::write(dir.join("depots.csv"), DEPOTS).unwrap();
        fs::write(dir.join("network.geojson"), NETWORK).unwrap();
        fs::write(dir.join("de02.csv"), INSPECTIONS).unwrap();
        Workspace::new(
            InputsConfig {
                defects: dir.join("de05.csv"),
                depots: dir.join("depots.csv"),
                network: dir.join("network.geojson"),
                inspections: Some(dir.join("de02.csv")),
            },
            dir.join("out"),
            FieldsConfig::default(),
        )
    }

    fn run(workspace: &Workspace) -> crate::pipeline::PipelineOutput {
        let settings = PipelineSettings {
            extent: Some(Extent::new(0.0, 0.0, 4000.0, 2000.0)),
            ..PipelineSettings::default()
        };
        Pipeline::new(settings)
            .run(
                workspace.load_defects().unwrap(),
                &workspace.load_depots().unwrap(),
                workspace.load_network().unwrap(),
                &workspace.load_inspections().unwrap(),
            )
            .unwrap()
    }

    #[test]
    fn test_colliding_depot_names_get_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = workspace(dir.path());
        workspace.prepare_output().unwrap();

        let mut spaced = DefectRecord::new("1", "OPEN", 0.0, 0.0);
        spaced.responsible_depot = Some("South Cave".to_string());
        let mut underscored = DefectRecord::new("2", "OPEN", 0.0, 0.0);
        underscored.responsible_depot = Some("South_Cave".to_string());
        let partitions = crate::pipeline::partition_by_depot(&[spaced, underscored]);

        let paths = workspace.write_partitions(&partitions).unwrap();
        assert_eq!(paths.len(), 2);
        assert_ne!(paths[0], paths[1]);
        assert!(paths[0].ends_with("South_Cave_Defects.csv"));
        assert!(paths[1].ends_with("South_Cave_2_Defects.csv"));

        let first = fs::read_to_string(&paths[0]).unwrap();
        let second = fs::read_to_string(&paths[1]).unwrap();
        assert!(first.lines().nth(1).unwrap().starts_with("1,"));
        assert!(second.lines().nth(1).unwrap().starts_with("2,"));
    }

    #[test]
    fn test_full_run_writes_every_output() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = workspace(dir.path());
        let output = run(&workspace);

        workspace.prepare_output().unwrap();
        let enriched = workspace.write_enriched(&output.records).unwrap();
        let partitions = workspace.write_partitions(&output.partitions).unwrap();
        workspace.write_catchments(&output.catchments).unwrap();
        workspace.write_inspections(&workspace.load_inspections().unwrap()).unwrap();
        workspace.write_audit(&output.audit).unwrap();

        let text = fs::read_to_string(&enriched).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[1],
            "1,OUTSTANDING,800,1002,P1,South Cave,M62/100,300.000,Hard Shoulder,de05: 1,2"
        );
        assert_eq!(lines[3], "4,OUTSTANDING,-10,1000,P1,,,,,de05: 4,0");

        let names: Vec<String> = partitions
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["South_Cave_Defects.csv", "West_Cowick_Defects.csv"]);

        let audit_text = fs::read_to_string(dir.path().join("out").join(AUDIT_FILE)).unwrap();
        let audit: serde_json::Value = serde_json::from_str(&audit_text).unwrap();
        assert_eq!(audit["incomplete_records"], 1);
        assert_eq!(audit["orphaned_inspections"][0], "9");
        assert!(dir.path().join("out").join(CATCHMENTS_FILE).exists());
        assert!(dir.path().join("out").join(INSPECTIONS_FILE).exists());
    }

    #[test]
    fn test_rerun_over_enriched_output_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = workspace(dir.path());
        let output = run(&workspace);
        workspace.prepare_output().unwrap();
        let enriched = workspace.write_enriched(&output.records).unwrap();
        let first = fs::read_to_string(&enriched).unwrap();

        // Feed the enriched file back in as the defect source
        fs::copy(&enriched, dir.path().join("de05.csv")).unwrap();
        let output = run(&workspace);
        workspace.write_enriched(&output.records).unwrap();
        let second = fs::read_to_string(&enriched).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_prepare_output_removes_stale_partitions() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = workspace(dir.path());
        let partition_dir = dir.path().join("out").join(PARTITION_DIR);
        fs::create_dir_all(&partition_dir).unwrap();
        fs::write(partition_dir.join("Old_Depot_Defects.csv"), "x").unwrap();
        fs::write(partition_dir.join("notes.txt"), "keep").unwrap();

        workspace.prepare_output().unwrap();
        assert!(!partition_dir.join("Old_Depot_Defects.csv").exists());
        assert!(partition_dir.join("notes.txt").exists());
    }

    #[test]
    fn test_no_inspection_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut workspace = workspace(dir.path());
        workspace.inputs.inspections = None;
        assert!(workspace.load_inspections().unwrap().is_empty());
    }
}
