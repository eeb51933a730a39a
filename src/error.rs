//! Error types for dataset loading, query parsing and document export.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while loading the allotment dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The dataset file does not exist.
    #[error("dataset not found: {path}")]
    Unavailable { path: PathBuf },

    /// The file exists but could not be read as a table.
    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The workbook could not be opened or its sheet could not be read.
    #[error("failed to read workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// The workbook has no sheets.
    #[error("workbook {path} has no worksheet")]
    NoWorksheet { path: PathBuf },

    /// The file extension is neither a workbook nor CSV.
    #[error("unsupported dataset format: {path} (expected .xlsx or .csv)")]
    UnsupportedFormat { path: PathBuf },

    /// A column the filter depends on is absent from the header row.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: &'static str, path: PathBuf },

    /// Rows were present but none survived normalization.
    #[error("no usable rows in {path} ({rows} rows read, all incomplete or non-numeric)")]
    Unparseable { path: PathBuf, rows: usize },
}

impl DatasetError {
    /// True for the "file is missing" kind, false for every malformed-data kind.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DatasetError::Unavailable { .. })
    }
}

/// An enumerated query choice that did not match any known value.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid {field} '{value}', expected one of: {expected}")]
pub struct QueryError {
    pub field: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Errors raised while writing an exported document.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to render PDF: {message}")]
    Pdf { message: String },
}
