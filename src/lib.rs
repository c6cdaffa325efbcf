//! Product-Scrape: a polite single-site product scraper
//!
//! This crate walks the paginated search results of one e-commerce site,
//! fetches every discovered product page with jittered delays and
//! bot-challenge aware retries, and extracts a fixed-shape record per product.

pub mod config;
pub mod crawler;
pub mod output;
pub mod product;
pub mod url;

use thiserror::Error;

/// Main error type for Product-Scrape operations
///
/// Only setup failures surface through this type. Failures inside
/// the scrape loop are absorbed at the narrowest scope and counted instead.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid header value for {name}: {value}")]
    InvalidHeader { name: &'static str, value: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Not a product URL: {0}")]
    NotAProduct(String),
}

/// Result type alias for Product-Scrape operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{scrape, Coordinator, ScrapeReport};
pub use product::ProductRecord;
pub use url::{normalize_product_url, repair_url, search_page_url};
