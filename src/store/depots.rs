use csv::{ReaderBuilder, Trim};
use std::path::Path;
use tracing::info;

use crate::error::{LocateError, Result};
use crate::models::Depot;

const KIND: &str = "depots";

/// Read depot sites (DEPOT, Easting, Northing)
pub fn read_depots(path: &Path) -> Result<Vec<Depot>> {
    info!("Loading depots from {}", path.display());

    if !path.exists() {
        return Err(LocateError::MissingInput {
            kind: KIND,
            path: path.to_path_buf(),
        });
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)?;

    let depots = reader
        .deserialize::<Depot>()
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if depots.is_empty() {
        return Err(LocateError::EmptyInput(KIND));
    }

    info!("Loaded {} depots", depots.len());
    Ok(depots)
}
