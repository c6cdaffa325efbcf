//! Product-Scrape main entry point
//!
//! This is the command-line interface for the Product-Scrape search scraper.

use chrono::Local;
use clap::Parser;
use product_scrape::config::{self, load_config_with_hash, Config};
use product_scrape::crawler::scrape;
use product_scrape::output::{
    generate_markdown_summary, print_sample, print_statistics, CsvOutputHandler, OutputHandler,
    RunSummary, XlsxOutputHandler,
};
use product_scrape::url::{parse_base_url, search_page_url};
use product_scrape::ScrapeReport;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Product-Scrape: a polite single-site product scraper
///
/// Product-Scrape walks the search results for one term, visits every
/// product it finds with randomized delays and bot-challenge aware retries,
/// and exports the product details as CSV and as a spreadsheet.
#[derive(Parser, Debug)]
#[command(name = "product-scrape")]
#[command(version = "1.0.0")]
#[command(about = "A polite single-site product scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the first search URL without scraping
    #[arg(long)]
    dry_run: bool,

    /// Override the configured search term
    #[arg(long, value_name = "TERM")]
    search_term: Option<String>,

    /// Override the number of result pages to walk
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Override the product cap
    #[arg(long, value_name = "N")]
    max_products: Option<usize>,

    /// Override the export directory
    #[arg(long, value_name = "DIR")]
    output_dir: Option<String>,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(term) = &self.search_term {
            config.search.term = term.clone();
        }
        if let Some(max_pages) = self.max_pages {
            config.search.max_pages = max_pages;
        }
        if let Some(max_products) = self.max_products {
            config.search.max_products = max_products;
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    cli.apply_overrides(&mut config);
    if let Err(e) = config::validate(&config) {
        tracing::error!("Invalid command-line override: {}", e);
        return Err(e.into());
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_scrape(config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("product_scrape=info,warn"),
            1 => EnvFilter::new("product_scrape=debug,info"),
            2 => EnvFilter::new("product_scrape=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Product-Scrape Dry Run ===\n");

    println!("Search:");
    println!("  Term: {}", config.search.term);
    println!("  Site: {}", config.search.base_url);
    println!("  Max pages: {}", config.search.max_pages);
    println!("  Max products: {}", config.search.max_products);

    let fetch = &config.fetch;
    println!("\nFetching:");
    println!("  Max attempts: {}", fetch.max_attempts);
    println!("  Timeout: {}s", fetch.timeout_secs);
    for (name, delay) in [
        ("Request delay", fetch.request_delay),
        ("Retry delay", fetch.retry_delay),
        ("Challenge delay", fetch.challenge_delay),
        ("Page delay", fetch.page_delay),
    ] {
        println!("  {}: {}-{}ms", name, delay.min_ms, delay.max_ms);
    }
    println!("  Challenge markers: {}", fetch.challenge_markers.join(", "));

    println!("\nHeaders:");
    println!("  User-Agent: {}", config.headers.user_agent);
    println!("  Accept-Language: {}", config.headers.accept_language);
    println!("  Referer: {}", config.referer());

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  File prefix: {}", config.output.file_prefix);
    println!("  Spreadsheet: {}", config.output.spreadsheet);
    if let Some(summary_path) = &config.output.summary_path {
        println!("  Summary: {}", summary_path);
    }

    let base_url = parse_base_url(&config.search.base_url)?;
    let first_page = search_page_url(&base_url, &config.search.term, 1)?;

    println!("\n✓ Configuration is valid");
    println!("✓ Would start at {}", first_page);

    Ok(())
}

/// Handles the main scrape operation
async fn handle_scrape(config: Config, config_hash: &str) -> Result<(), Box<dyn std::error::Error>> {
    let output = config.output.clone();
    let search_term = config.search.term.clone();
    let base_url = config.search.base_url.clone();

    let report = match scrape(config).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            return Err(e.into());
        }
    };

    if report.records.is_empty() {
        tracing::warn!("No products were scraped; nothing to export");
        print_statistics(&report.stats);
        return Ok(());
    }

    let ScrapeReport { records, stats } = report;

    println!();
    print_statistics(&stats);
    print_sample(&records);

    let finished_at = Local::now();
    let handler = CsvOutputHandler::for_run(&output, &search_term, finished_at);
    let export_path = handler.write_records(&records)?;
    println!("\n✓ Data saved to {}", export_path.display());

    if output.spreadsheet {
        let spreadsheet = XlsxOutputHandler::for_run(&output, &search_term, finished_at);
        match spreadsheet.write_records(&records) {
            Ok(path) => println!("✓ Spreadsheet saved to {}", path.display()),
            Err(e) => tracing::warn!(
                "Could not save spreadsheet {}: {}",
                spreadsheet.path().display(),
                e
            ),
        }
    }

    if let Some(summary_path) = &output.summary_path {
        let summary = RunSummary {
            search_term: &search_term,
            base_url: &base_url,
            config_hash: Some(config_hash),
            generated_at: finished_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            stats: &stats,
            records: &records,
            export_path: Some(export_path),
        };

        tracing::info!("Generating markdown summary...");
        generate_markdown_summary(&summary, Path::new(summary_path))?;
        println!("✓ Summary exported to: {}", summary_path);
    }

    Ok(())
}
