use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Failures while reading the source file into a [`ListingDataset`].
///
/// All of these are fatal: the dashboard cannot run without a dataset.
///
/// [`ListingDataset`]: super::model::ListingDataset
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("sheet '{sheet}' not found (available: {})", available.join(", "))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    #[error("required column '{0}' not found in the selected column range")]
    MissingColumn(String),

    #[error("data row {row}: '{value}' is not a valid Property Listing Date")]
    InvalidDate { row: usize, value: String },

    #[error("invalid column range '{0}'")]
    InvalidColumnRange(String),

    #[error("source has no header row")]
    Empty,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("malformed source: {0}")]
    Malformed(String),
}

/// A filter selection that cannot be applied as given.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("date range start {start} is after end {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },
}

/// Data-integrity failures found while aggregating a filtered view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    #[error("data row {row}: column '{column}' holds non-numeric value '{value}'")]
    NonNumeric {
        row: usize,
        column: &'static str,
        value: String,
    },
}
