//! Spreadsheet output handler
//!
//! Writes the same rows as the CSV export into a single-sheet workbook.

use crate::config::OutputConfig;
use crate::output::csv_output::export_file_stem;
use crate::output::traits::{OutputHandler, OutputResult};
use crate::product::ProductRecord;
use chrono::{DateTime, Local};
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};

/// Longest sheet name a workbook accepts
const MAX_SHEET_NAME_CHARS: usize = 31;

/// Characters a sheet name cannot contain
const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Sheet name used when the term leaves nothing usable
const DEFAULT_SHEET_NAME: &str = "Products";

/// Workbook writer for scraped products
#[derive(Debug, Clone)]
pub struct XlsxOutputHandler {
    path: PathBuf,
    sheet_name: String,
}

impl XlsxOutputHandler {
    /// Creates a handler that writes to `path` with a sheet named after `search_term`
    pub fn new(path: impl Into<PathBuf>, search_term: &str) -> Self {
        Self {
            path: path.into(),
            sheet_name: sheet_name(search_term),
        }
    }

    /// Creates a handler for the run's export, sharing the CSV file stem
    pub fn for_run(config: &OutputConfig, search_term: &str, timestamp: DateTime<Local>) -> Self {
        let file_name = format!(
            "{}.xlsx",
            export_file_stem(&config.file_prefix, search_term, timestamp)
        );
        Self::new(Path::new(&config.directory).join(file_name), search_term)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }
}

impl OutputHandler for XlsxOutputHandler {
    fn write_records(&self, records: &[ProductRecord]) -> OutputResult<PathBuf> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.sheet_name)?;

        for (col, field) in ProductRecord::FIELDS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *field, &header_format)?;
        }

        for (index, record) in records.iter().enumerate() {
            let row = index as u32 + 1;
            for (col, value) in record.to_row().iter().enumerate() {
                worksheet.write_string(row, col as u16, *value)?;
            }
        }

        workbook.save(&self.path)?;

        tracing::info!(
            "Saved {} products to {}",
            records.len(),
            self.path.display()
        );
        Ok(self.path.clone())
    }
}

/// Turns a search term into a valid worksheet name
fn sheet_name(search_term: &str) -> String {
    let cleaned: String = search_term
        .trim()
        .chars()
        .map(|c| if FORBIDDEN_SHEET_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME_CHARS)
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim();

    if cleaned.is_empty() {
        DEFAULT_SHEET_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}
