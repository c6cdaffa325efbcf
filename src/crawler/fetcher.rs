//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building HTTP clients with a browser-like header set
//! - Jittered delays before every request
//! - Retry logic for transport failures, bad statuses and challenge pages
//! - Error classification

use crate::config::Config;
use crate::crawler::retry::{AttemptOutcome, RetryPolicy, Verdict};
use crate::url::repair_url;
use crate::ScrapeError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Upper bound for establishing a connection, independent of the request timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A page that was fetched successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code (always 200)
    pub status_code: u16,
    /// Page body content
    pub body: String,
}

/// Why a fetch did not produce a page
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// Connection, DNS, timeout or request construction failure
    #[error("transport error: {error}")]
    Transport { error: String },

    /// The server answered with something other than 200
    #[error("HTTP status {status_code}")]
    HttpStatus { status_code: u16 },

    /// A challenge page was served instead of content
    #[error("bot challenge detected (matched \"{marker}\")")]
    BotChallenge { marker: String },

    /// Every attempt failed
    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<FetchFailure>,
    },
}

/// Result of one logical fetch
pub type FetchResult = Result<FetchedPage, FetchFailure>;

/// Builds an HTTP client with the configured headers and timeout
///
/// # Arguments
///
/// * `config` - The scraper configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(ScrapeError)` - A header value was invalid or the client failed to build
///
/// # Example
///
/// ```no_run
/// use product_scrape::config::Config;
/// use product_scrape::crawler::build_http_client;
///
/// let config = Config::new("mobile", "https://www.amazon.in", 5, 50);
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, ScrapeError> {
    let mut headers = HeaderMap::new();
    insert_header(&mut headers, USER_AGENT, "User-Agent", &config.headers.user_agent)?;
    insert_header(&mut headers, ACCEPT, "Accept", &config.headers.accept)?;
    insert_header(
        &mut headers,
        ACCEPT_LANGUAGE,
        "Accept-Language",
        &config.headers.accept_language,
    )?;
    insert_header(&mut headers, REFERER, "Referer", &config.referer())?;

    let timeout = Duration::from_secs(config.fetch.timeout_secs);

    let client = Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

fn insert_header(
    headers: &mut HeaderMap,
    name: HeaderName,
    label: &'static str,
    value: &str,
) -> Result<(), ScrapeError> {
    let value = HeaderValue::from_str(value).map_err(|_| ScrapeError::InvalidHeader {
        name: label,
        value: value.to_string(),
    })?;
    headers.insert(name, value);
    Ok(())
}

/// Issues GET requests one at a time under a [`RetryPolicy`]
///
/// `fetch` takes `&mut self`, so a fetcher can never have two requests in
/// flight. The coordinator owns exactly one fetcher, which keeps the whole
/// run strictly sequential.
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    /// Creates a fetcher with its own HTTP client
    pub fn new(config: &Config) -> Result<Self, ScrapeError> {
        Ok(Self {
            client: build_http_client(config)?,
            policy: RetryPolicy::from_config(&config.fetch),
        })
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches a URL with delay, retry and challenge handling
    ///
    /// # Request Flow
    ///
    /// 1. Repair a duplicated scheme in the URL (once, before any request)
    /// 2. Sleep a jittered request delay
    /// 3. Send the GET and classify the outcome
    /// 4. On failure, sleep the retry or challenge delay and go to 2
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 200, no challenge marker | Return the page |
    /// | 200 with challenge marker | Challenge delay, retry |
    /// | Other status | Retry delay, retry |
    /// | Connection/timeout error | Retry delay, retry |
    /// | Request could not be built | Fail immediately |
    ///
    /// All retries count toward `max-attempts`; no backoff is taken after
    /// the last attempt. A challenge page is never returned as success.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    ///
    /// # Returns
    ///
    /// The fetched page, or the reason it could not be fetched
    pub async fn fetch(&mut self, url: &str) -> FetchResult {
        let url = repair_url(url);
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            self.policy.request_delay().wait().await;

            tracing::debug!("GET {} (attempt {}/{})", url, attempt, max_attempts);
            let outcome = self.send(&url).await;
            let verdict = self.policy.classify(outcome);
            let backoff = self.policy.backoff(&verdict);

            let failure = match verdict {
                Verdict::Success(page) => return Ok(page),
                Verdict::Terminal(failure) => {
                    tracing::warn!("Request to {} cannot succeed: {}", url, failure);
                    return Err(failure);
                }
                Verdict::SoftFailure(failure) | Verdict::HardFailure(failure) => failure,
            };

            if attempt >= max_attempts {
                tracing::warn!(
                    "Giving up on {} after {} attempts: {}",
                    url,
                    attempt,
                    failure
                );
                return Err(FetchFailure::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(failure),
                });
            }

            tracing::warn!(
                "Attempt {}/{} for {} failed: {}. Retrying...",
                attempt,
                max_attempts,
                url,
                failure
            );

            if let Some(delay) = backoff {
                let waited = delay.wait().await;
                tracing::debug!("Backed off {:.1}s before retrying", waited.as_secs_f64());
            }

            attempt += 1;
        }
    }

    /// Sends a single GET and captures what came back
    async fn send(&self, url: &str) -> AttemptOutcome {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return transport_outcome(&e),
        };

        let status = response.status();
        let final_url = response.url().to_string();

        // The body of an error status is never inspected
        if status != StatusCode::OK {
            return AttemptOutcome::Response {
                final_url,
                status,
                body: String::new(),
            };
        }

        match response.text().await {
            Ok(body) => AttemptOutcome::Response {
                final_url,
                status,
                body,
            },
            Err(e) => transport_outcome(&e),
        }
    }
}

/// Classifies a reqwest error into a transport outcome
fn transport_outcome(error: &reqwest::Error) -> AttemptOutcome {
    let description = if error.is_timeout() {
        format!("request timeout: {}", error)
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    };

    AttemptOutcome::Transport {
        error: description,
        retryable: !error.is_builder(),
    }
}
