//! Defect enrichment pipeline.
//!
//! Filters active defects, assigns each to a depot catchment, locates it on
//! the reference network, classifies its lane position, then audits the
//! result and splits it by depot.

mod audit;
mod partition;

pub use audit::{
    anomalies_for, audit, Anomaly, AuditReport, DerivedField, MissingField, RecordAnomaly,
};
pub use partition::{partition_by_depot, partition_name};

use hashbrown::HashMap;
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::catchment::{build_catchments, Extent};
use crate::error::{LocateError, Result};
use crate::models::{Depot, DefectRecord, DepotCatchment, InspectionRecord, NetworkSegment};
use crate::pip::DepotResolver;
use crate::route::{RouteLocator, DEFAULT_SEARCH_RADIUS};
use crate::xsp::{classify_with, LaneGuard};

/// Tunables for one run
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Catchment extent; derived from the network and depots when None
    pub extent: Option<Extent>,
    pub search_radius: f64,
    pub lane_guard: LaneGuard,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            extent: None,
            search_radius: DEFAULT_SEARCH_RADIUS,
            lane_guard: LaneGuard::Enforced,
        }
    }
}

/// Everything one run produces
#[derive(Debug)]
pub struct PipelineOutput {
    /// Active defects, enriched, in input order
    pub records: Vec<DefectRecord>,
    /// Completed or superseded defects dropped by the status filter
    pub filtered_out: usize,
    pub extent: Extent,
    pub catchments: Vec<DepotCatchment>,
    pub partitions: BTreeMap<String, Vec<DefectRecord>>,
    pub audit: AuditReport,
}

/// Read-only reference data shared by every per-defect step
pub struct ReferenceData {
    pub extent: Extent,
    pub catchments: Vec<DepotCatchment>,
    pub resolver: DepotResolver,
    pub locator: RouteLocator,
}

impl ReferenceData {
    /// Build catchments and indexes. Fails when depots or network are empty.
    pub fn build(
        depots: &[Depot],
        network: Vec<NetworkSegment>,
        settings: &PipelineSettings,
    ) -> Result<Self> {
        if depots.is_empty() {
            return Err(LocateError::EmptyInput("depots"));
        }
        if network.is_empty() {
            return Err(LocateError::EmptyInput("network"));
        }

        let extent = match settings.extent {
            Some(extent) => extent,
            None => {
                let coords = network
                    .iter()
                    .flat_map(|s| s.geometry.0.iter().flat_map(|part| part.0.iter().copied()))
                    .chain(depots.iter().map(Depot::site));
                let extent = Extent::covering(coords, settings.search_radius)
                    .ok_or(LocateError::EmptyInput("network"))?;
                info!(
                    "No extent configured, using ({:.0}, {:.0}) - ({:.0}, {:.0})",
                    extent.min_x, extent.min_y, extent.max_x, extent.max_y
                );
                extent
            }
        };

        let catchments = build_catchments(depots, &extent);
        if catchments.is_empty() {
            warn!("No depot catchment overlaps the extent; every defect will be unassigned");
        }
        let resolver = DepotResolver::from_catchments(catchments.clone()).with_extent(extent);
        let locator = RouteLocator::from_segments(network, settings.search_radius);

        Ok(Self {
            extent,
            catchments,
            resolver,
            locator,
        })
    }
}

pub struct Pipeline {
    settings: PipelineSettings,
    progress: Option<ProgressBar>,
}

impl Pipeline {
    pub fn new(settings: PipelineSettings) -> Self {
        Self {
            settings,
            progress: None,
        }
    }

    /// Tick `progress` once per enriched defect
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run every stage over an in-memory dataset.
    ///
    /// Only missing or empty reference data is an error; defects that cannot
    /// be assigned, located or classified come back with empty fields and
    /// are listed in the audit.
    pub fn run(
        &self,
        defects: Vec<DefectRecord>,
        depots: &[Depot],
        network: Vec<NetworkSegment>,
        inspections: &[InspectionRecord],
    ) -> Result<PipelineOutput> {
        let total = defects.len();
        let mut records: Vec<DefectRecord> =
            defects.into_iter().filter(|d| d.status.is_active()).collect();
        let filtered_out = total - records.len();
        info!(
            "{} of {} defects are outstanding ({} completed or superseded)",
            records.len(),
            total,
            filtered_out
        );

        let reference = ReferenceData::build(depots, network, &self.settings)?;

        let mut inspection_counts: HashMap<&str, usize> = HashMap::new();
        for inspection in inspections {
            *inspection_counts.entry(inspection.defect_id.as_str()).or_default() += 1;
        }

        if let Some(pb) = &self.progress {
            pb.set_length(records.len() as u64);
        }

        // Map: each record is enriched independently
        records.par_iter_mut().for_each(|record| {
            self.enrich(record, &reference);
            record.inspection_count = inspection_counts
                .get(record.defect_id.as_str())
                .copied()
                .unwrap_or(0);
            if let Some(pb) = &self.progress {
                pb.inc(1);
            }
        });

        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }

        // Reduce: audit and partition once every record is done
        let located = records.iter().filter(|r| r.location.is_some()).count();
        let assigned = records.iter().filter(|r| r.responsible_depot.is_some()).count();
        info!("Assigned {} of {} defects to a depot", assigned, records.len());
        info!("Located {} of {} defects on the network", located, records.len());

        let audit = audit(&records, inspections);
        let partitions = partition_by_depot(&records);

        Ok(PipelineOutput {
            records,
            filtered_out,
            extent: reference.extent,
            catchments: reference.catchments,
            partitions,
            audit,
        })
    }

    /// Derive depot, location and lane position for one defect. Earlier
    /// derived values are discarded first.
    pub fn enrich(&self, record: &mut DefectRecord, reference: &ReferenceData) {
        record.clear_derived();

        record.responsible_depot = reference.resolver.resolve_id(record.easting, record.northing);

        if let Some(found) = reference.locator.locate(record.easting, record.northing) {
            record.lane_position = Some(classify_with(
                found.projection.offset,
                found.segment.lane_count,
                self.settings.lane_guard,
            ));
            record.location = Some(found.to_location());
        }

        for anomaly in anomalies_for(record) {
            debug!("Defect {}: {}", record, anomaly);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DefectStatus, LaneCount};
    use crate::xsp::LanePosition;
    use geo::{LineString, MultiLineString};

    fn depots() -> Vec<Depot> {
        vec![Depot::new("Aston", 1000.0, 1000.0), Depot::new("Tingley", 3000.0, 1000.0)]
    }

    fn line(coords: Vec<(f64, f64)>) -> MultiLineString<f64> {
        MultiLineString::new(vec![LineString::from(coords)])
    }

    fn network() -> Vec<NetworkSegment> {
        vec![
            NetworkSegment::new(
                "M1/100",
                line(vec![(500.0, 1000.0), (1500.0, 1000.0)]),
                LaneCount::Two,
            ),
            NetworkSegment::new(
                "M18/300",
                line(vec![(3000.0, 500.0), (3000.0, 1500.0)]),
                LaneCount::Four,
            ),
        ]
    }

    fn settings() -> PipelineSettings {
        PipelineSettings {
            extent: Some(Extent::new(0.0, 0.0, 4000.0, 2000.0)),
            ..PipelineSettings::default()
        }
    }

    fn defects() -> Vec<DefectRecord> {
        vec![
            // 2.0 on the nearside of M1/100, inside Aston's catchment
            DefectRecord::new("1", "OUTSTANDING", 800.0, 1002.0),
            // Offside of M18/300 (heading north, east is the right), 8.0 out
            DefectRecord::new("2", "INSTRUCTED", 3008.0, 1200.0),
            DefectRecord::new("3", "COMPLETED", 800.0, 1002.0),
            // Inside the extent, far from any section
            DefectRecord::new("4", "OUTSTANDING", 2000.0, 100.0),
            // Outside the extent and off the network
            DefectRecord::new("5", "OUTSTANDING", -10.0, 1000.0),
        ]
    }

    #[test]
    fn test_end_to_end_enrichment() {
        let output = Pipeline::new(settings())
            .run(defects(), &depots(), network(), &[])
            .unwrap();

        assert_eq!(output.filtered_out, 1);
        assert_eq!(output.records.len(), 4);
        assert!(output.records.iter().all(|r| r.status == DefectStatus::Active));

        let first = &output.records[0];
        assert_eq!(first.responsible_depot.as_deref(), Some("Aston"));
        assert_eq!(first.section(), Some("M1/100"));
        assert_eq!(first.chainage(), Some(300.0));
        assert_eq!(first.offset(), Some(2.0));
        assert_eq!(first.lane_position, Some(LanePosition::HardShoulder));

        let second = &output.records[1];
        assert_eq!(second.responsible_depot.as_deref(), Some("Tingley"));
        assert_eq!(second.section(), Some("M18/300"));
        assert_eq!(second.chainage(), Some(700.0));
        assert_eq!(second.lane_position, Some(LanePosition::Lane3));

        let far = &output.records[2];
        assert_eq!(far.defect_id, "4");
        assert!(far.responsible_depot.is_some());
        assert!(far.location.is_none());
        assert!(far.lane_position.is_none());
    }

    #[test]
    fn test_anomalies_are_reported_not_raised() {
        let output = Pipeline::new(settings())
            .run(defects(), &depots(), network(), &[])
            .unwrap();

        let outside = output.records.iter().find(|r| r.defect_id == "5").unwrap();
        assert!(outside.responsible_depot.is_none());
        assert!(outside.location.is_none());

        assert_eq!(output.audit.active_records, 4);
        assert_eq!(output.audit.incomplete_records, 2);
        assert_eq!(output.audit.missing_count("Responsible_Depot"), 1);
        assert_eq!(output.audit.missing_count("Section"), 2);
        assert_eq!(output.audit.anomaly_count(Anomaly::UnlocatedPoint), 2);
    }

    #[test]
    fn test_partitions_by_depot() {
        let output = Pipeline::new(settings())
            .run(defects(), &depots(), network(), &[])
            .unwrap();

        let keys: Vec<&str> = output.partitions.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Aston", "Tingley"]);
        assert_eq!(output.partitions["Aston"].len(), 2);
        assert_eq!(output.partitions["Tingley"].len(), 1);
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let pipeline = Pipeline::new(settings());
        let first = pipeline.run(defects(), &depots(), network(), &[]).unwrap();
        let again = pipeline
            .run(first.records.clone(), &depots(), network(), &[])
            .unwrap();
        assert_eq!(first.records, again.records);

        let fresh = pipeline.run(defects(), &depots(), network(), &[]).unwrap();
        assert_eq!(first.records, fresh.records);
    }

    #[test]
    fn test_fully_resolvable_dataset_audits_clean() {
        let defects = vec![
            DefectRecord::new("10", "OPEN", 900.0, 998.0),
            DefectRecord::new("11", "OPEN", 2998.0, 900.0),
        ];
        let output = Pipeline::new(settings())
            .run(defects, &depots(), network(), &[])
            .unwrap();
        assert!(output.audit.is_complete());
        assert_eq!(output.audit.incomplete_records, 0);
        assert_eq!(output.records[0].lane_position, Some(LanePosition::Lane1));
        assert_eq!(output.records[1].lane_position, Some(LanePosition::HardShoulder));
    }

    #[test]
    fn test_inspection_links() {
        let inspections = vec![
            InspectionRecord { defect_id: "1".to_string(), attributes: vec![] },
            InspectionRecord { defect_id: "1".to_string(), attributes: vec![] },
            InspectionRecord { defect_id: "3".to_string(), attributes: vec![] },
        ];
        let output = Pipeline::new(settings())
            .run(defects(), &depots(), network(), &inspections)
            .unwrap();
        assert_eq!(output.records[0].inspection_count, 2);
        assert_eq!(output.records[1].inspection_count, 0);
        // Defect 3 was completed, so its inspection has no active parent
        assert_eq!(output.audit.orphaned_inspections, vec!["3".to_string()]);
    }

    #[test]
    fn test_missing_reference_data_is_fatal() {
        let pipeline = Pipeline::new(settings());
        let err = pipeline.run(defects(), &[], network(), &[]).unwrap_err();
        assert!(matches!(err, LocateError::EmptyInput("depots")));
        let err = pipeline.run(defects(), &depots(), vec![], &[]).unwrap_err();
        assert!(matches!(err, LocateError::EmptyInput("network")));
    }

    #[test]
    fn test_derived_extent_covers_network() {
        let settings = PipelineSettings::default();
        let reference = ReferenceData::build(&depots(), network(), &settings).unwrap();
        assert_eq!(reference.extent, Extent::new(450.0, 450.0, 3050.0, 1550.0));
        assert_eq!(reference.catchments.len(), 2);
    }

    #[test]
    fn test_legacy_lane_guard() {
        let settings = PipelineSettings {
            lane_guard: LaneGuard::Legacy,
            ..settings()
        };
        // 20.0 offside of a two-lane section
        let defects = vec![DefectRecord::new("20", "OPEN", 700.0, 980.0)];
        let output = Pipeline::new(settings)
            .run(defects, &depots(), network(), &[])
            .unwrap();
        assert_eq!(output.records[0].lane_position, Some(LanePosition::Lane2));
    }
}
