//! Resilient HTTP fetch
//!
//! GET with a per-attempt timeout, retried with exponential backoff plus
//! random jitter until `max_retries` attempts have failed.
//!
//! **Algorithm:**
//! 1. Attempt request (attempt numbers are 1-based in logs)
//! 2. 2xx with a JSON body: return it
//! 3. HTTP error status, connection error, timeout or unreadable body:
//!    a. log WARN with attempt number and cause
//!    b. if attempts remain: sleep `base_delay * 2^attempt + jitter`, retry
//!    c. otherwise: log ERROR, return [`FetchError::Exhausted`]

use qss_common::config::RetryConfig;
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Retry limits for [`fetch_with_retries`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts before giving up
    pub max_retries: u32,
    /// Backoff before the second attempt (doubles each retry)
    pub base_delay: Duration,
    /// Per-attempt request timeout
    pub timeout: Duration,
    /// Upper bound of the uniform random jitter added to each backoff
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryConfig::default().into()
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.base_delay,
            timeout: config.timeout,
            max_jitter: config.max_jitter,
        }
    }
}

impl RetryPolicy {
    /// Deterministic part of the backoff after 0-based `attempt`
    pub fn base_backoff(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .unwrap_or(Duration::MAX)
    }

    /// Full backoff after 0-based `attempt`: base backoff plus jitter
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.base_backoff(attempt).saturating_add(self.jitter())
    }

    fn jitter(&self) -> Duration {
        if self.max_jitter.is_zero() {
            return Duration::ZERO;
        }
        let secs = rand::thread_rng().gen_range(0.0..=self.max_jitter.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

/// Why a single attempt failed
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("HTTP error on attempt {attempt}: {status}")]
    Status { attempt: u32, status: StatusCode },

    #[error("Timeout on attempt {attempt}: {source}")]
    Timeout { attempt: u32, source: reqwest::Error },

    #[error("Connection error on attempt {attempt}: {source}")]
    Connection { attempt: u32, source: reqwest::Error },

    #[error("Invalid response body on attempt {attempt}: {source}")]
    Body { attempt: u32, source: reqwest::Error },
}

/// Terminal fetch failure
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to fetch data from {url} after {max_retries} retries")]
    Exhausted { url: String, max_retries: u32 },
}

fn request_error(attempt: u32, source: reqwest::Error) -> AttemptError {
    if source.is_timeout() {
        AttemptError::Timeout { attempt, source }
    } else {
        AttemptError::Connection { attempt, source }
    }
}

async fn fetch_once(
    client: &Client,
    url: &str,
    timeout: Duration,
    attempt: u32,
) -> Result<Value, AttemptError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| request_error(attempt, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AttemptError::Status { attempt, status });
    }

    response.json::<Value>().await.map_err(|source| {
        if source.is_timeout() {
            AttemptError::Timeout { attempt, source }
        } else {
            AttemptError::Body { attempt, source }
        }
    })
}

/// GET `url` and parse its JSON body, retrying transient failures.
///
/// The client is reused for every attempt. With `max_retries == 0` no
/// request is made and the call fails immediately.
pub async fn fetch_with_retries(
    url: &str,
    client: &Client,
    policy: &RetryPolicy,
) -> Result<Value, FetchError> {
    for attempt in 0..policy.max_retries {
        match fetch_once(client, url, policy.timeout, attempt + 1).await {
            Ok(body) => {
                if attempt > 0 {
                    debug!(url = %url, attempt = attempt + 1, "Fetch succeeded after retry");
                }
                return Ok(body);
            }
            Err(err) => {
                warn!(
                    url = %url,
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    "{}",
                    err
                );

                if attempt + 1 < policy.max_retries {
                    let delay = policy.backoff_delay(attempt);
                    debug!(
                        url = %url,
                        backoff_ms = delay.as_millis() as u64,
                        "Backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    let err = FetchError::Exhausted {
        url: url.to_string(),
        max_retries: policy.max_retries,
    };
    error!(url = %url, "{}", err);
    Err(err)
}
