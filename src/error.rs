//! Fatal errors. Anything here aborts the run; per-defect gaps are
//! reported through the audit instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("{kind} input not found at {}", path.display())]
    MissingInput { kind: &'static str, path: PathBuf },

    #[error("{0} input contains no usable rows")]
    EmptyInput(&'static str),

    #[error("{kind} input is missing column '{column}'")]
    MissingColumn { kind: &'static str, column: String },

    #[error("{kind} row {row}: {reason}")]
    InvalidRow {
        kind: &'static str,
        row: usize,
        reason: String,
    },

    #[error("network feature {feature}: {reason}")]
    InvalidGeometry { feature: usize, reason: String },

    #[error("section {section}: unknown lane count '{value}'")]
    InvalidLaneCount { section: String, value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    GeoJson(#[from] geojson::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LocateError>;
