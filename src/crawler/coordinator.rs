//! Scrape coordinator - main pipeline orchestration logic
//!
//! This module contains the main scrape loop that drives:
//! - Pagination over the search results
//! - Product link discovery and deduplication
//! - Fetching and extracting each product page
//! - Stopping at the product cap

use crate::config::{validate, Config};
use crate::crawler::extractor::Extractor;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::parse_search_results;
use crate::crawler::retry::DelayRange;
use crate::output::RunStatistics;
use crate::product::{truncate_display, ProductRecord};
use crate::url::{parse_base_url, search_page_url};
use crate::ScrapeError;
use scraper::Html;
use std::collections::HashSet;
use std::time::Instant;
use url::Url;

/// Outcome of a finished run
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    /// Records in discovery order, unique by URL
    pub records: Vec<ProductRecord>,

    /// Counters collected during the run
    pub stats: RunStatistics,
}

/// Main scrape coordinator structure
///
/// Owns the single [`Fetcher`] of the run and the accumulating record list.
/// Every request is awaited before the next one is issued.
pub struct Coordinator {
    config: Config,
    base_url: Url,
    fetcher: Fetcher,
    extractor: Extractor,
    page_delay: DelayRange,
    records: Vec<ProductRecord>,
    seen: HashSet<String>,
    stats: RunStatistics,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The scraper configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(ScrapeError)` - Invalid configuration or HTTP client setup failure
    pub fn new(config: Config) -> Result<Self, ScrapeError> {
        let fetcher = Fetcher::new(&config)?;
        Self::with_fetcher(config, fetcher)
    }

    /// Creates a coordinator around an already built fetcher
    pub fn with_fetcher(config: Config, fetcher: Fetcher) -> Result<Self, ScrapeError> {
        validate(&config)?;
        let base_url = parse_base_url(&config.search.base_url)?;
        let extractor = Extractor::new(config.extract.clone());
        let page_delay = config.fetch.page_delay.into();

        Ok(Self {
            config,
            base_url,
            fetcher,
            extractor,
            page_delay,
            records: Vec::new(),
            seen: HashSet::new(),
            stats: RunStatistics::new(),
        })
    }

    fn cap_reached(&self) -> bool {
        self.records.len() >= self.config.search.max_products
    }

    /// Runs the scrape to completion
    ///
    /// This is the core pipeline that:
    /// 1. Walks search-result pages 1..=max-pages
    /// 2. Extracts and deduplicates product links
    /// 3. Fetches and extracts each product until the cap is hit
    /// 4. Waits a jittered page delay between pages, except after a page
    ///    that could not be fetched
    ///
    /// Nothing inside the loop aborts the run: failed pages, failed fetches
    /// and failed extractions are logged, counted and skipped.
    pub async fn run(mut self) -> ScrapeReport {
        let start_time = Instant::now();
        let max_pages = self.config.search.max_pages;

        tracing::info!(
            "Searching for '{}' on {}",
            self.config.search.term,
            self.base_url
        );

        'pages: for page in 1..=max_pages {
            tracing::info!("Processing page {}/{}...", page, max_pages);

            // No page delay after a failed page
            let Some(links) = self.discover_products(page).await else {
                continue;
            };
            let batch = self.dedup(links);

            if !batch.is_empty() {
                tracing::info!("Found {} new products on page {}", batch.len(), page);
            }

            for url in batch {
                if self.cap_reached() {
                    tracing::info!(
                        "Reached maximum product limit ({})",
                        self.config.search.max_products
                    );
                    break 'pages;
                }

                self.scrape_product(&url).await;
            }

            if self.cap_reached() {
                tracing::info!(
                    "Reached maximum product limit ({})",
                    self.config.search.max_products
                );
                break;
            }

            if page < max_pages {
                let delay = self.page_delay.sample();
                tracing::info!(
                    "Waiting {:.1} seconds before next page...",
                    delay.as_secs_f64()
                );
                tokio::time::sleep(delay).await;
            }
        }

        self.stats.cap_reached = self.cap_reached();
        self.stats.elapsed = start_time.elapsed();

        if self.records.is_empty() {
            tracing::warn!("No products found or scraping failed");
        } else {
            tracing::info!(
                "Scraped {} products in {:.2}s",
                self.records.len(),
                self.stats.elapsed.as_secs_f64()
            );
        }

        ScrapeReport {
            records: self.records,
            stats: self.stats,
        }
    }

    /// Fetches one results page and returns its product links
    ///
    /// Returns None when the page could not be fetched.
    async fn discover_products(&mut self, page: u32) -> Option<Vec<String>> {
        let search_url = match search_page_url(&self.base_url, &self.config.search.term, page) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("Cannot build URL for page {}: {}", page, e);
                self.stats.pages_failed += 1;
                return None;
            }
        };

        self.stats.pages_requested += 1;

        match self.fetcher.fetch(search_url.as_str()).await {
            Ok(fetched) => {
                let parsed = parse_search_results(&fetched.body, &self.base_url);
                if parsed.used_fallback {
                    tracing::debug!("Page {}: primary link selector matched nothing", page);
                }
                Some(parsed.links)
            }
            Err(failure) => {
                self.stats.pages_failed += 1;
                tracing::warn!(
                    "Failed to fetch page {}: {}. Moving to next page if available.",
                    page,
                    failure
                );
                None
            }
        }
    }

    /// Drops links already queued on this page or already recorded
    fn dedup(&mut self, links: Vec<String>) -> Vec<String> {
        let mut queued = HashSet::new();
        let batch: Vec<String> = links
            .into_iter()
            .filter(|link| !self.seen.contains(link) && queued.insert(link.clone()))
            .collect();

        self.stats.links_discovered += batch.len() as u64;
        batch
    }

    /// Fetches and extracts one product, appending the record on success
    async fn scrape_product(&mut self, url: &str) {
        self.stats.products_attempted += 1;

        let fetched = match self.fetcher.fetch(url).await {
            Ok(fetched) => fetched,
            Err(failure) => {
                self.stats.product_fetch_failures += 1;
                tracing::warn!("Skipping {}: {}", url, failure);
                return;
            }
        };

        let extracted = {
            let document = Html::parse_document(&fetched.body);
            self.extractor.extract(&document, url)
        };

        match extracted {
            Ok(record) => {
                if !self.seen.insert(record.url.clone()) {
                    tracing::debug!("Already recorded {}", record.url);
                    return;
                }
                tracing::info!("Scraped: {}", truncate_display(&record.title, 30));
                self.records.push(record);
                self.stats.products_scraped += 1;
            }
            Err(e) => {
                self.stats.extraction_failures += 1;
                tracing::warn!("Error extracting product details from {}: {}", url, e);
            }
        }
    }
}

/// Runs a complete scrape with a fresh coordinator
///
/// # Arguments
///
/// * `config` - The scraper configuration
///
/// # Returns
///
/// * `Ok(ScrapeReport)` - The run finished (possibly with zero records)
/// * `Err(ScrapeError)` - The coordinator could not be set up
///
/// # Example
///
/// ```no_run
/// use product_scrape::config::load_config;
/// use product_scrape::crawler::run_scrape;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("scrape.toml"))?;
/// let report = run_scrape(config).await?;
/// println!("{} products", report.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_scrape(config: Config) -> Result<ScrapeReport, ScrapeError> {
    let coordinator = Coordinator::new(config)?;
    Ok(coordinator.run().await)
}
