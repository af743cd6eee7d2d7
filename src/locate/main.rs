//! Defect location batch run.
//!
//! Loads defects, depots and the reference network, assigns each
//! outstanding defect a depot, section, chainage and lane position, and
//! exports the result split by depot.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use linref::config::Config;
use linref::pipeline::{AuditReport, Pipeline, PipelineSettings};
use linref::store::Workspace;

#[derive(Parser, Debug)]
#[command(name = "locate")]
#[command(about = "Assign depots, sections, chainages and lane positions to defects")]
struct Args {
    /// Run configuration (TOML)
    #[arg(short, long, default_value = "locate.toml")]
    config: PathBuf,

    /// Override the configured output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Log per-defect detail
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let started = Instant::now();
    info!("Linref defect location");
    info!("Config: {}", args.config.display());

    let mut config = Config::load_from_file(&args.config)?;
    if let Some(dir) = args.output_dir {
        config.output.dir = dir;
    }

    let workspace = Workspace::from_config(&config);

    let defects = workspace.load_defects().context("Failed to load defects")?;
    let depots = workspace.load_depots().context("Failed to load depots")?;
    let network = workspace.load_network().context("Failed to load network")?;
    let inspections = workspace
        .load_inspections()
        .context("Failed to load inspections")?;

    let pb = ProgressBar::new(defects.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
            )?
            .progress_chars("#>-"),
    );

    let settings = PipelineSettings {
        extent: config.extent,
        search_radius: config.locator.search_radius,
        lane_guard: config.classifier.lane_guard,
    };
    let output = Pipeline::new(settings)
        .with_progress(pb)
        .run(defects, &depots, network, &inspections)?;

    info!("Exporting to {}", workspace.output_dir().display());
    workspace.prepare_output()?;
    workspace.write_enriched(&output.records)?;
    workspace.write_partitions(&output.partitions)?;
    workspace.write_catchments(&output.catchments)?;
    if !inspections.is_empty() {
        workspace.write_inspections(&inspections)?;
    }
    let audit_path = workspace.write_audit(&output.audit)?;

    for (depot, records) in &output.partitions {
        info!("  {}: {} defects", depot, records.len());
    }
    report_audit(&output.audit);
    info!("Audit written to {}", audit_path.display());

    info!(
        "Workflow complete in {:.1} seconds",
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Print the missing-field enumeration
fn report_audit(audit: &AuditReport) {
    for missing in &audit.missing {
        info!("Testing for missing {} values:", missing.field);
        for id in &missing.defect_ids {
            warn!("{} ----> EMPTY VALUE FOUND!", id);
        }
    }

    if !audit.orphaned_inspections.is_empty() {
        warn!(
            "{} inspection defect ids have no outstanding defect: {}",
            audit.orphaned_inspections.len(),
            audit.orphaned_inspections.join(", ")
        );
    }

    if audit.is_complete() {
        info!("All {} outstanding defects fully located", audit.active_records);
    } else {
        warn!(
            "{} of {} outstanding defects have missing values",
            audit.incomplete_records, audit.active_records
        );
    }
}
