use crate::core::error::{SeriesError, SeriesResult};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

pub const USER_AGENT: &str = concat!("covecon/", env!("CARGO_PKG_VERSION"));
const RETRIES: usize = 3;
const RETRY_DELAY_MS: u64 = 500;

/// Retries an async operation with configurable attempts and delays
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts
///
/// # Returns
/// Either the successful result or the error after all attempts
pub async fn with_retry<F, Fut, T, E>(mut operation: F, retries: usize, delay_ms: u64) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, retries, err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// Builds the client shared by every provider. `reqwest::Client` is a handle
/// onto one connection pool, so clones reuse connections.
pub fn http_client() -> SeriesResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| SeriesError::unavailable("http", format!("Failed to build client: {e}")))
}

/// GETs `url` and returns the body of a successful response.
///
/// Transport errors are retried; a non-success status is not.
pub async fn fetch_body(client: &reqwest::Client, provider: &str, url: &str) -> SeriesResult<String> {
    // Query strings may carry access tokens.
    let loggable = url.split('?').next().unwrap_or(url);
    debug!("Requesting {} data from {}", provider, loggable);

    let response = with_retry(|| client.get(url).send(), RETRIES, RETRY_DELAY_MS)
        .await
        .map_err(|e| SeriesError::unavailable(provider, format!("Request error: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SeriesError::unavailable(provider, format!("HTTP error: {status}")));
    }

    response
        .text()
        .await
        .map_err(|e| SeriesError::unavailable(provider, format!("Failed to read body: {e}")))
}
