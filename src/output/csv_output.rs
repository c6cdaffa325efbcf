//! CSV output handler
//!
//! Writes the final record sequence as a delimited table with one header row
//! and one row per product.

use crate::config::OutputConfig;
use crate::output::traits::{OutputHandler, OutputResult};
use crate::product::ProductRecord;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// CSV file writer for scraped products
#[derive(Debug, Clone)]
pub struct CsvOutputHandler {
    path: PathBuf,
}

impl CsvOutputHandler {
    /// Creates a handler that writes to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a handler for a timestamped export inside the output directory
    ///
    /// # Arguments
    ///
    /// * `config` - Output directory and file prefix
    /// * `search_term` - Search term of the run, embedded in the file name
    /// * `timestamp` - Time the run finished
    pub fn for_run(config: &OutputConfig, search_term: &str, timestamp: DateTime<Local>) -> Self {
        let file_name = export_file_name(&config.file_prefix, search_term, timestamp);
        Self::new(Path::new(&config.directory).join(file_name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputHandler for CsvOutputHandler {
    fn write_records(&self, records: &[ProductRecord]) -> OutputResult<PathBuf> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;

        // Written explicitly so an empty export still has its columns
        writer.write_record(ProductRecord::FIELDS)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        tracing::info!("Saved {} products to {}", records.len(), self.path.display());
        Ok(self.path.clone())
    }
}

/// Builds `{prefix}_{term}_{YYYYmmdd_HHMMSS}.csv`
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use product_scrape::output::export_file_name;
///
/// let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
/// assert_eq!(
///     export_file_name("amazon", "usb cable", at),
///     "amazon_usb_cable_20240309_140500.csv"
/// );
/// ```
pub fn export_file_name(prefix: &str, search_term: &str, timestamp: DateTime<Local>) -> String {
    format!("{}.csv", export_file_stem(prefix, search_term, timestamp))
}

/// Builds the extension-less export name shared by every export format
///
/// Characters of the term that are awkward in file names become `_`.
pub fn export_file_stem(prefix: &str, search_term: &str, timestamp: DateTime<Local>) -> String {
    let term: String = search_term
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();

    format!(
        "{}_{}_{}",
        prefix,
        term,
        timestamp.format("%Y%m%d_%H%M%S")
    )
}
