//! Retry with jittered exponential back-off for listing page fetches.
//!
//! Only transient failures are retried; a 4xx other than 429 or a failed
//! automation run is returned to the caller unchanged.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for errors worth another attempt.
///
/// Retriable: network timeout or connect failure, HTTP 429, HTTP 5xx.
fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ScraperError::RateLimited { .. } => true,
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        ScraperError::InvalidBaseUrl { .. } | ScraperError::AutomationFailed(_) => false,
    }
}

/// Runs `operation`, retrying transient errors up to `max_retries` more times.
///
/// The n-th retry waits `backoff_base_ms * 2^(n-1)` ms, capped at 30 s, with
/// ±25 % jitter. A 429 waits for its `Retry-After` instead, under the same
/// cap. The last error is returned once retries are exhausted.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay_ms = retry_delay_ms(&err, attempt, backoff_base_ms);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient listings error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// Delay before retry number `attempt` (1-based).
fn retry_delay_ms(err: &ScraperError, attempt: u32, backoff_base_ms: u64) -> u64 {
    if let ScraperError::RateLimited {
        retry_after_secs, ..
    } = err
    {
        return retry_after_secs.saturating_mul(1_000).min(MAX_DELAY_MS);
    }
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    jittered(computed.min(MAX_DELAY_MS))
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn jittered(delay_ms: u64) -> u64 {
    (delay_ms as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64
}
