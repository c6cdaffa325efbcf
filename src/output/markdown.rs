//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a scrape run,
//! including statistics, the export location and a sample of the results.

use crate::output::stats::SAMPLE_ROWS;
use crate::output::traits::{OutputResult, RunSummary};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Generates a markdown summary of a run and writes it to `output_path`
///
/// # Arguments
///
/// * `summary` - The run summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &RunSummary<'_>, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run summary as markdown
pub fn format_markdown_summary(summary: &RunSummary<'_>) -> String {
    let stats = summary.stats;
    let mut md = String::new();

    md.push_str("# Product Scrape Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Search term**: {}\n", summary.search_term));
    md.push_str(&format!("- **Site**: {}\n", summary.base_url));
    md.push_str(&format!("- **Generated**: {}\n", summary.generated_at));
    if let Some(hash) = summary.config_hash {
        md.push_str(&format!("- **Config hash**: `{}`\n", hash));
    }
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        stats.elapsed.as_secs_f64()
    ));
    if let Some(path) = &summary.export_path {
        md.push_str(&format!("- **Export**: `{}`\n", path.display()));
    }
    md.push('\n');

    md.push_str("## Statistics\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Pages requested | {} |\n", stats.pages_requested));
    md.push_str(&format!("| Pages failed | {} |\n", stats.pages_failed));
    md.push_str(&format!(
        "| Product links discovered | {} |\n",
        stats.links_discovered
    ));
    md.push_str(&format!(
        "| Products attempted | {} |\n",
        stats.products_attempted
    ));
    md.push_str(&format!("| Products scraped | {} |\n", stats.products_scraped));
    md.push_str(&format!(
        "| Product fetch failures | {} |\n",
        stats.product_fetch_failures
    ));
    md.push_str(&format!(
        "| Extraction failures | {} |\n",
        stats.extraction_failures
    ));
    md.push('\n');
    md.push_str(&format!("**Success rate**: {:.1}%\n", stats.success_rate()));
    if stats.cap_reached {
        md.push_str("\nThe run stopped early at the product limit.\n");
    }
    md.push('\n');

    md.push_str("## Sample Results\n\n");
    if summary.records.is_empty() {
        md.push_str("_No products found._\n");
    } else {
        md.push_str("| Title | Price | Rating | Reviews |\n");
        md.push_str("|-------|-------|--------|---------|\n");
        for record in summary.records.iter().take(SAMPLE_ROWS) {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                escape_cell(&record.title),
                escape_cell(&record.price),
                escape_cell(&record.rating),
                escape_cell(&record.reviews)
            ));
        }
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::RunStatistics;
    use crate::product::ProductRecord;
    use std::path::PathBuf;
    use std::time::Duration;

    fn stats() -> RunStatistics {
        RunStatistics {
            pages_requested: 2,
            links_discovered: 4,
            products_attempted: 4,
            products_scraped: 3,
            product_fetch_failures: 1,
            cap_reached: true,
            elapsed: Duration::from_millis(1500),
            ..RunStatistics::default()
        }
    }

    fn record() -> ProductRecord {
        ProductRecord {
            title: "Phone | 5G".to_string(),
            price: "₹9,999".to_string(),
            rating: "4.2".to_string(),
            reviews: "88".to_string(),
            availability: "In Stock".to_string(),
            description: "N/A".to_string(),
            url: "https://www.amazon.in/dp/B0X".to_string(),
        }
    }

    fn summary<'a>(stats: &'a RunStatistics, records: &'a [ProductRecord]) -> RunSummary<'a> {
        RunSummary {
            search_term: "mobile",
            base_url: "https://www.amazon.in",
            config_hash: Some("abc123"),
            generated_at: "2024-01-01 10:00:00".to_string(),
            stats,
            records,
            export_path: Some(PathBuf::from("results/products.csv")),
        }
    }

    #[test]
    fn test_summary_contains_run_information() {
        let stats = stats();
        let records = vec![record()];
        let md = format_markdown_summary(&summary(&stats, &records));

        assert!(md.starts_with("# Product Scrape Summary"));
        assert!(md.contains("- **Search term**: mobile"));
        assert!(md.contains("`abc123`"));
        assert!(md.contains("`results/products.csv`"));
        assert!(md.contains("| Products scraped | 3 |"));
        assert!(md.contains("**Success rate**: 75.0%"));
        assert!(md.contains("product limit"));
    }

    #[test]
    fn test_summary_escapes_pipes() {
        let stats = stats();
        let records = vec![record()];
        let md = format_markdown_summary(&summary(&stats, &records));
        assert!(md.contains("| Phone \\| 5G | ₹9,999 | 4.2 | 88 |"));
    }

    #[test]
    fn test_summary_without_records() {
        let stats = RunStatistics::default();
        let md = format_markdown_summary(&summary(&stats, &[]));
        assert!(md.contains("_No products found._"));
    }

    #[test]
    fn test_generate_writes_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("reports/summary.md");
        let stats = stats();
        let records = vec![record()];

        generate_markdown_summary(&summary(&stats, &records), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("## Statistics"));
    }
}
