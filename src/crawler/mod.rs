//! Crawler module for product page fetching and processing
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching with jittered delays and retry logic
//! - Search-results parsing and product link extraction
//! - Product-page field extraction
//! - Overall scrape coordination

mod coordinator;
mod extractor;
mod fetcher;
mod parser;
mod retry;

pub use coordinator::{run_scrape, Coordinator, ScrapeReport};
pub use extractor::{
    first_match, format_price, format_review_count, leading_token, ExtractError, Extractor,
    Lookup,
};
pub use fetcher::{build_http_client, FetchFailure, FetchResult, FetchedPage, Fetcher};
pub use parser::{extract_product_links, parse_search_results, ParsedResults};
pub use retry::{AttemptOutcome, DelayRange, RetryPolicy, Verdict};

use crate::config::Config;
use crate::ScrapeError;

/// Runs a complete scrape operation
///
/// This is the main entry point for starting a scrape. It will:
/// 1. Build the HTTP client and retry policy
/// 2. Walk the search-result pages
/// 3. Fetch and extract every new product page
/// 4. Stop at the product cap or after the last page
///
/// # Arguments
///
/// * `config` - The scraper configuration
///
/// # Returns
///
/// * `Ok(ScrapeReport)` - Records and statistics of the finished run
/// * `Err(ScrapeError)` - Setup failed before any request was made
pub async fn scrape(config: Config) -> Result<ScrapeReport, ScrapeError> {
    run_scrape(config).await
}
