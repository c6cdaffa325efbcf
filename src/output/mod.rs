//! Output module for exporting scraped products and run reports
//!
//! This module handles:
//! - Writing the final record sequence as CSV and as a spreadsheet
//! - Generating markdown summaries of a run
//! - Recording and printing run statistics

mod csv_output;
mod markdown;
pub mod stats;
mod traits;
mod xlsx_output;

pub use csv_output::{export_file_name, export_file_stem, CsvOutputHandler};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{format_sample, format_statistics, print_sample, print_statistics, RunStatistics};
pub use traits::{OutputError, OutputHandler, OutputResult, RunSummary};
pub use xlsx_output::XlsxOutputHandler;
