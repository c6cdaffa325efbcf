//! Retry policy for the fetcher
//!
//! The policy is pure: it turns the raw outcome of one attempt into a
//! [`Verdict`] and says how long to back off before the next attempt. The
//! imperative retry loop lives in [`Fetcher::fetch`](super::Fetcher::fetch).

use crate::config::{DelayConfig, FetchConfig};
use crate::crawler::fetcher::{FetchFailure, FetchedPage};
use rand::Rng;
use reqwest::StatusCode;
use std::time::Duration;

/// Inclusive range a jittered delay is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min_ms: u64,
    max_ms: u64,
}

impl DelayRange {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    /// Draws a delay uniformly from the range
    pub fn sample(&self) -> Duration {
        if self.min_ms == self.max_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::rng().random_range(self.min_ms..=self.max_ms))
    }

    /// Sleeps for a freshly sampled delay and returns how long it slept
    pub async fn wait(&self) -> Duration {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        delay
    }
}

impl From<DelayConfig> for DelayRange {
    fn from(config: DelayConfig) -> Self {
        Self::new(config.min_ms, config.max_ms)
    }
}

/// What a single request attempt produced
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    /// The server answered
    Response {
        final_url: String,
        status: StatusCode,
        body: String,
    },

    /// No usable response (connection, DNS, timeout, body read, bad request)
    Transport {
        error: String,
        /// False when repeating the request cannot help, e.g. an unparseable URL
        retryable: bool,
    },
}

/// Classification of one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Real content; return it
    Success(FetchedPage),
    /// Challenge page; back off longer and retry
    SoftFailure(FetchFailure),
    /// Transport failure or non-200 status; back off and retry
    HardFailure(FetchFailure),
    /// Retrying cannot help; give up now
    Terminal(FetchFailure),
}

/// Retry bounds, delays and challenge detection for one fetcher
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    request_delay: DelayRange,
    retry_delay: DelayRange,
    challenge_delay: DelayRange,
    challenge_markers: Vec<String>,
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            request_delay: config.request_delay.into(),
            retry_delay: config.retry_delay.into(),
            challenge_delay: config.challenge_delay.into(),
            challenge_markers: config
                .challenge_markers
                .iter()
                .map(|m| m.trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay taken before every attempt
    pub fn request_delay(&self) -> DelayRange {
        self.request_delay
    }

    /// Returns the first challenge marker found in `body`, ignoring case
    pub fn detect_challenge(&self, body: &str) -> Option<&str> {
        let body = body.to_lowercase();
        self.challenge_markers
            .iter()
            .find(|marker| body.contains(marker.as_str()))
            .map(String::as_str)
    }

    /// Classifies the outcome of one attempt
    ///
    /// | Outcome | Verdict |
    /// |---------|---------|
    /// | Transport error, request could not be built | Terminal |
    /// | Transport error | HardFailure |
    /// | Status other than 200 | HardFailure |
    /// | 200 with a challenge marker in the body | SoftFailure |
    /// | 200 otherwise | Success |
    pub fn classify(&self, outcome: AttemptOutcome) -> Verdict {
        match outcome {
            AttemptOutcome::Transport {
                error,
                retryable: false,
            } => Verdict::Terminal(FetchFailure::Transport { error }),

            AttemptOutcome::Transport { error, .. } => {
                Verdict::HardFailure(FetchFailure::Transport { error })
            }

            AttemptOutcome::Response { status, .. } if status != StatusCode::OK => {
                Verdict::HardFailure(FetchFailure::HttpStatus {
                    status_code: status.as_u16(),
                })
            }

            AttemptOutcome::Response {
                final_url,
                status,
                body,
            } => match self.detect_challenge(&body) {
                Some(marker) => Verdict::SoftFailure(FetchFailure::BotChallenge {
                    marker: marker.to_string(),
                }),
                None => Verdict::Success(FetchedPage {
                    final_url,
                    status_code: status.as_u16(),
                    body,
                }),
            },
        }
    }

    /// Delay to take after a failed attempt before trying again
    pub fn backoff(&self, verdict: &Verdict) -> Option<DelayRange> {
        match verdict {
            Verdict::SoftFailure(_) => Some(self.challenge_delay),
            Verdict::HardFailure(_) => Some(self.retry_delay),
            Verdict::Success(_) | Verdict::Terminal(_) => None,
        }
    }
}
