//! HTTP fetcher implementation
//!
//! This module performs the single page request of a check, including:
//! - Building the HTTP client with the per-attempt timeout
//! - Randomized pacing before the first request
//! - Browser-like request headers with a randomly chosen User-Agent
//! - Retry with exponential backoff on transport failures
//! - Timing telemetry for diagnostics

use crate::config::FetchConfig;
use crate::monitor::pacing::{backoff_delay, sample_delay, Sleeper, TokioSleeper};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Static headers sent alongside the User-Agent
const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
    ),
    ("accept-language", "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7"),
    ("cache-control", "max-age=0"),
    ("priority", "u=0,i"),
    (
        "sec-ch-ua",
        "\"Google Chrome\";v=\"137\", \"Chromium\";v=\"137\", \"Not/A)Brand\";v=\"24\"",
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"macOS\""),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "same-origin"),
    ("upgrade-insecure-requests", "1"),
];

/// Errors that end a fetch
#[derive(Debug, Error)]
pub enum FetchError {
    /// Every attempt failed at the transport level
    #[error("request to {url} failed after {attempts} attempt(s): {source}")]
    Transport {
        url: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
}

/// Outcome of a single request attempt
#[derive(Debug)]
enum AttemptOutcome {
    /// 2xx response with its body
    Success(String),

    /// Connection, timeout, protocol or body read failure
    Transport(reqwest::Error),

    /// Non-2xx response
    Status(StatusCode),
}

/// One request attempt and how long it took
#[derive(Debug)]
struct FetchAttempt {
    /// 1-based attempt index
    index: u32,
    elapsed: Duration,
    outcome: AttemptOutcome,
}

/// Timing telemetry for one `fetch` call
#[derive(Debug, Clone, Copy)]
struct FetchTimings {
    attempts: u32,
    delay: Duration,
    fetch: Duration,
    total: Duration,
}

impl FetchTimings {
    fn log(&self, url: &str) {
        tracing::debug!(
            url,
            attempts = self.attempts,
            delay_secs = self.delay.as_secs_f64(),
            fetch_secs = self.fetch.as_secs_f64(),
            total_secs = self.total.as_secs_f64(),
            "Fetch timings"
        );
    }
}

/// Builds an HTTP client with the configured per-attempt timeout
///
/// # Arguments
///
/// * `config` - The fetch configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(config.timeout_duration())
        .connect_timeout(config.timeout_duration())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Builds the full header set for a request with the given User-Agent
pub fn browser_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for &(name, value) in BROWSER_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    match HeaderValue::from_str(user_agent) {
        Ok(value) => {
            headers.insert(header::USER_AGENT, value);
        }
        Err(_) => {
            tracing::warn!(user_agent, "User agent is not a valid header value, omitting it");
        }
    }

    headers
}

/// Fetches the product page with pacing and retries
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
    rng: StdRng,
    sleeper: Arc<dyn Sleeper>,
}

impl Fetcher {
    /// Creates a fetcher with an entropy-seeded RNG and the tokio sleeper
    pub fn new(config: FetchConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config)?;
        Ok(Self {
            client,
            config,
            rng: StdRng::from_entropy(),
            sleeper: Arc::new(TokioSleeper),
        })
    }

    /// Replaces the random source used for pacing and User-Agent choice
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Replaces the sleeper used for pacing and backoff
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Picks one User-Agent uniformly from the configured pool
    fn choose_user_agent(&mut self) -> String {
        self.config
            .user_agents
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default()
    }

    /// Fetches a URL and returns its body
    ///
    /// # Request Flow
    ///
    /// 1. Sleep a random delay drawn from `[min-delay, max-delay]`
    /// 2. Pick a User-Agent and build the browser headers
    /// 3. Send GET requests until one completes or attempts run out
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 2xx | Return body |
    /// | Non-2xx status | Immediate → `FetchError::Status` |
    /// | Timeout / connection / protocol error | Retry after `backoff-factor^(attempt-1)` s |
    /// | Transport error on last attempt | `FetchError::Transport` |
    pub async fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
        let started = Instant::now();

        let delay = sample_delay(&mut self.rng, self.config.min_delay, self.config.max_delay);
        tracing::debug!(delay_secs = delay.as_secs_f64(), "Pacing before request");
        self.sleeper.sleep(delay).await;

        let user_agent = self.choose_user_agent();
        let headers = browser_headers(&user_agent);
        let max_attempts = self.config.max_retries.max(1);
        let timeout_secs = self.config.timeout;

        let request_started = Instant::now();
        let mut index = 1;

        let result = loop {
            tracing::info!(
                url,
                attempt = index,
                max_attempts,
                timeout_secs,
                user_agent = user_agent.as_str(),
                "Sending request"
            );

            let attempt = self.attempt(url, index, headers.clone()).await;
            let elapsed_secs = attempt.elapsed.as_secs_f64();

            match attempt.outcome {
                AttemptOutcome::Success(body) => {
                    tracing::debug!(attempt = attempt.index, elapsed_secs, bytes = body.len(), "Request succeeded");
                    break Ok(body);
                }
                AttemptOutcome::Status(status) => {
                    tracing::warn!(attempt = attempt.index, elapsed_secs, %status, "Server returned an error status");
                    break Err(FetchError::Status {
                        url: url.to_string(),
                        status,
                    });
                }
                AttemptOutcome::Transport(error) => {
                    tracing::warn!(
                        attempt = attempt.index,
                        max_attempts,
                        elapsed_secs,
                        kind = transport_error_kind(&error),
                        error = %error,
                        "Request failed"
                    );

                    if attempt.index >= max_attempts {
                        break Err(FetchError::Transport {
                            url: url.to_string(),
                            attempts: attempt.index,
                            source: error,
                        });
                    }

                    let backoff = backoff_delay(self.config.backoff_factor, attempt.index);
                    tracing::info!(backoff_secs = backoff.as_secs_f64(), "Retrying after backoff");
                    self.sleeper.sleep(backoff).await;
                }
            }

            index += 1;
        };

        FetchTimings {
            attempts: index,
            delay,
            fetch: request_started.elapsed(),
            total: started.elapsed(),
        }
        .log(url);

        result
    }

    /// Sends one GET request and classifies the outcome
    async fn attempt(&self, url: &str, index: u32, headers: HeaderMap) -> FetchAttempt {
        let started = Instant::now();

        let outcome = match self.client.get(url).headers(headers).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    match response.text().await {
                        Ok(body) => AttemptOutcome::Success(body),
                        Err(e) => AttemptOutcome::Transport(e),
                    }
                } else {
                    AttemptOutcome::Status(status)
                }
            }
            Err(e) => AttemptOutcome::Transport(e),
        };

        FetchAttempt {
            index,
            elapsed: started.elapsed(),
            outcome,
        }
    }
}

/// Short label for a transport error, used in log events
fn transport_error_kind(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        "timeout"
    } else if error.is_connect() {
        "connect"
    } else if error.is_body() || error.is_decode() {
        "body"
    } else if error.is_redirect() {
        "redirect"
    } else {
        "request"
    }
}
