//! Output handler traits and types
//!
//! This module defines the trait interface for output handlers and
//! the data handed to the run summary.

use crate::output::stats::RunStatistics;
use crate::product::ProductRecord;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Everything the markdown summary reports about a run
#[derive(Debug, Clone)]
pub struct RunSummary<'a> {
    /// Search term of the run
    pub search_term: &'a str,

    /// Site origin that was scraped
    pub base_url: &'a str,

    /// SHA-256 of the configuration file, when loaded from disk
    pub config_hash: Option<&'a str>,

    /// Local time the summary was generated
    pub generated_at: String,

    /// Counters of the run
    pub stats: &'a RunStatistics,

    /// Exported records
    pub records: &'a [ProductRecord],

    /// Where the records were exported to
    pub export_path: Option<PathBuf>,
}

/// Trait for output handlers
///
/// An output handler turns the final, ordered record sequence into a file.
/// Records are written in the order given, one row per record, columns in
/// [`ProductRecord::FIELDS`] order.
pub trait OutputHandler {
    /// Writes all records and returns the path that was written
    ///
    /// # Arguments
    ///
    /// * `records` - The final record sequence of a run
    fn write_records(&self, records: &[ProductRecord]) -> OutputResult<PathBuf>;
}
