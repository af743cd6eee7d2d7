//! Headered CSV tables with named columns.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;

use crate::error::{LocateError, Result};
use crate::models::columns;

/// A CSV file read as rows of (column, value) pairs
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<StringRecord>,
}

impl Table {
    pub fn read(path: &Path, kind: &'static str) -> Result<Self> {
        if !path.exists() {
            return Err(LocateError::MissingInput {
                kind,
                path: path.to_path_buf(),
            });
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_path(path)?;

        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let rows = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { headers, rows })
    }

    /// Index of a required column, matched case-insensitively
    pub fn column(&self, kind: &'static str, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| LocateError::MissingColumn {
                kind,
                column: name.to_string(),
            })
    }

    /// Source columns of a row, minus anything the pipeline derives
    pub fn source_attributes(&self, row: &StringRecord) -> Vec<(String, String)> {
        self.headers
            .iter()
            .zip(row.iter())
            .filter(|(h, _)| !columns::is_derived(h))
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect()
    }
}
