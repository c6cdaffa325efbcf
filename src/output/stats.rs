//! Run statistics
//!
//! Counters collected by the coordinator while it scrapes, plus console
//! printers for the end-of-run report.

use crate::product::{truncate_display, ProductRecord};
use std::time::Duration;

/// Number of rows shown by [`print_sample`] by default
pub const SAMPLE_ROWS: usize = 10;

/// Counters for one scrape run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStatistics {
    /// Search-result pages requested
    pub pages_requested: u64,

    /// Search-result pages that could not be fetched
    pub pages_failed: u64,

    /// New product links queued after deduplication
    pub links_discovered: u64,

    /// Product pages the scraper tried to fetch
    pub products_attempted: u64,

    /// Records added to the output
    pub products_scraped: u64,

    /// Product pages that could not be fetched
    pub product_fetch_failures: u64,

    /// Product pages that were fetched but could not be extracted
    pub extraction_failures: u64,

    /// True when the run stopped at the product cap
    pub cap_reached: bool,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl RunStatistics {
    /// Creates a new empty statistics value
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the share of attempted products that produced a record
    pub fn success_rate(&self) -> f64 {
        if self.products_attempted == 0 {
            return 0.0;
        }
        (self.products_scraped as f64 / self.products_attempted as f64) * 100.0
    }

    /// Total number of skipped units of work
    pub fn total_failures(&self) -> u64 {
        self.pages_failed + self.product_fetch_failures + self.extraction_failures
    }
}

/// Formats run statistics as the console report
pub fn format_statistics(stats: &RunStatistics) -> String {
    let mut report = String::from("=== Scrape Statistics ===\n\n");

    report.push_str(&format!("Pages requested: {}\n", stats.pages_requested));
    report.push_str(&format!("Pages failed: {}\n", stats.pages_failed));
    report.push_str(&format!(
        "Product links discovered: {}\n",
        stats.links_discovered
    ));
    report.push_str(&format!("Products attempted: {}\n", stats.products_attempted));
    report.push_str(&format!("Products scraped: {}\n\n", stats.products_scraped));

    if stats.total_failures() > 0 {
        report.push_str("Skipped:\n");
        report.push_str(&format!("  Failed result pages: {}\n", stats.pages_failed));
        report.push_str(&format!(
            "  Product fetch failures: {}\n",
            stats.product_fetch_failures
        ));
        report.push_str(&format!(
            "  Extraction failures: {}\n\n",
            stats.extraction_failures
        ));
    }

    if stats.cap_reached {
        report.push_str("Stopped early: product limit reached\n");
    }

    report.push_str(&format!(
        "Time taken: {:.2} seconds\n",
        stats.elapsed.as_secs_f64()
    ));
    report.push_str(&format!(
        "Success Rate: {:.1}% ({} / {} products scraped)\n",
        stats.success_rate(),
        stats.products_scraped,
        stats.products_attempted
    ));

    report
}

/// Prints run statistics to stdout
pub fn print_statistics(stats: &RunStatistics) {
    print!("{}", format_statistics(stats));
}

/// Formats the first `rows` records as a fixed-width table of title, price,
/// rating and reviews
pub fn format_sample(records: &[ProductRecord], rows: usize) -> String {
    let mut table = format!(
        "{:<40}  {:>12}  {:>6}  {:>8}\n",
        "title", "price", "rating", "reviews"
    );

    for record in records.iter().take(rows) {
        table.push_str(&format!(
            "{:<40}  {:>12}  {:>6}  {:>8}\n",
            truncate_display(&record.title, 37),
            record.price,
            record.rating,
            record.reviews
        ));
    }

    table
}

/// Prints a sample of the scraped records
pub fn print_sample(records: &[ProductRecord]) {
    println!("\nSample Results:");
    print!("{}", format_sample(records, SAMPLE_ROWS));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str) -> ProductRecord {
        ProductRecord {
            title: title.to_string(),
            price: "₹499".to_string(),
            rating: "4.0".to_string(),
            reviews: "12".to_string(),
            availability: "In Stock".to_string(),
            description: "N/A".to_string(),
            url: format!("https://shop.example.com/dp/{}", title),
        }
    }

    #[test]
    fn test_statistics_new() {
        let stats = RunStatistics::new();
        assert_eq!(stats.products_scraped, 0);
        assert_eq!(stats.total_failures(), 0);
    }

    #[test]
    fn test_success_rate() {
        let stats = RunStatistics {
            products_attempted: 8,
            products_scraped: 6,
            ..RunStatistics::default()
        };
        assert!((stats.success_rate() - 75.0).abs() < 0.01);
    }

    #[test]
    fn test_success_rate_nothing_attempted() {
        assert_eq!(RunStatistics::new().success_rate(), 0.0);
    }

    #[test]
    fn test_total_failures() {
        let stats = RunStatistics {
            pages_failed: 1,
            product_fetch_failures: 2,
            extraction_failures: 3,
            ..RunStatistics::default()
        };
        assert_eq!(stats.total_failures(), 6);
    }

    #[test]
    fn test_skipped_block_lists_failed_pages() {
        let stats = RunStatistics {
            pages_requested: 2,
            pages_failed: 1,
            ..RunStatistics::default()
        };
        let report = format_statistics(&stats);
        assert!(report.contains("Skipped:\n  Failed result pages: 1\n"));
    }

    #[test]
    fn test_no_skipped_block_without_failures() {
        let report = format_statistics(&RunStatistics::new());
        assert!(!report.contains("Skipped:"));
    }

    #[test]
    fn test_sample_limits_rows() {
        let records: Vec<_> = (0..15).map(|i| record(&format!("P{}", i))).collect();
        let table = format_sample(&records, SAMPLE_ROWS);
        // header + 10 rows
        assert_eq!(table.lines().count(), 11);
        assert!(table.contains("P9"));
        assert!(!table.contains("P10"));
    }
}
