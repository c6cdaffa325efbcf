use serde::Deserialize;

/// Main configuration structure for Product-Scrape
///
/// Only `[search]` is mandatory; every other section falls back to the
/// defaults below.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub search: SearchConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub headers: HeaderConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Builds a configuration with default fetch, header, extract and output
    /// settings
    pub fn new(
        term: impl Into<String>,
        base_url: impl Into<String>,
        max_pages: u32,
        max_products: usize,
    ) -> Self {
        Self {
            search: SearchConfig {
                term: term.into(),
                base_url: base_url.into(),
                max_pages,
                max_products,
            },
            fetch: FetchConfig::default(),
            headers: HeaderConfig::default(),
            extract: ExtractConfig::default(),
            output: OutputConfig::default(),
        }
    }

    /// Referer header value: the configured one, or the site root
    pub fn referer(&self) -> String {
        self.headers
            .referer
            .clone()
            .unwrap_or_else(|| format!("{}/", self.search.base_url.trim_end_matches('/')))
    }
}

/// What to search for and how far to page
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Search term submitted to the results page
    pub term: String,

    /// Site origin, e.g. "https://www.amazon.in"
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Number of search-result pages to walk
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Product cap for the whole run
    #[serde(rename = "max-products")]
    pub max_products: usize,
}

/// Inclusive millisecond range a random delay is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DelayConfig {
    #[serde(rename = "min-ms")]
    pub min_ms: u64,

    #[serde(rename = "max-ms")]
    pub max_ms: u64,
}

impl DelayConfig {
    /// A range that never sleeps
    pub const NONE: DelayConfig = DelayConfig {
        min_ms: 0,
        max_ms: 0,
    };

    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }
}

/// Retry and pacing behavior of the fetcher
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Attempts per URL, first try included
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Delay before every attempt
    #[serde(rename = "request-delay")]
    pub request_delay: DelayConfig,

    /// Delay after a transport failure or non-200 status
    #[serde(rename = "retry-delay")]
    pub retry_delay: DelayConfig,

    /// Delay after a bot-challenge page
    #[serde(rename = "challenge-delay")]
    pub challenge_delay: DelayConfig,

    /// Delay between search-result pages
    #[serde(rename = "page-delay")]
    pub page_delay: DelayConfig,

    /// Case-insensitive body substrings that identify a challenge page
    #[serde(rename = "challenge-markers")]
    pub challenge_markers: Vec<String>,
}

impl FetchConfig {
    /// Same retry bounds and markers, but every delay range collapsed to zero
    pub fn without_delays(self) -> Self {
        Self {
            request_delay: DelayConfig::NONE,
            retry_delay: DelayConfig::NONE,
            challenge_delay: DelayConfig::NONE,
            page_delay: DelayConfig::NONE,
            ..self
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout_secs: 15,
            request_delay: DelayConfig::new(2_000, 5_000),
            retry_delay: DelayConfig::new(5_000, 10_000),
            challenge_delay: DelayConfig::new(10_000, 20_000),
            page_delay: DelayConfig::new(5_000, 10_000),
            challenge_markers: vec!["captcha".to_string(), "rush hour".to_string()],
        }
    }
}

/// Browser-identifying request headers
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    pub accept: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Defaults to the site root when unset
    pub referer: Option<String>,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,\
                     image/webp,image/apng,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            referer: None,
        }
    }
}

/// Field formatting applied by the extractor
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Prefix put in front of every found price
    #[serde(rename = "currency-symbol")]
    pub currency_symbol: String,

    #[serde(rename = "max-title-len")]
    pub max_title_len: usize,

    #[serde(rename = "max-description-len")]
    pub max_description_len: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
            max_title_len: 80,
            max_description_len: 100,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the CSV export is written to
    pub directory: String,

    /// File name prefix of the CSV export
    #[serde(rename = "file-prefix")]
    pub file_prefix: String,

    /// Also write an .xlsx copy next to the CSV export
    pub spreadsheet: bool,

    /// Path to an optional markdown run summary
    #[serde(rename = "summary-path")]
    pub summary_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "results".to_string(),
            file_prefix: "products".to_string(),
            spreadsheet: true,
            summary_path: None,
        }
    }
}
