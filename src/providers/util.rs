use anyhow::Error;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Runs `operation` up to `retries + 1` times, sleeping `delay_ms` between
/// failed attempts, and returns the first success or the last error.
pub async fn with_retry<F, Fut, T, E>(mut operation: F, retries: usize, delay_ms: u64) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<Error>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) if attempt >= retries => return Err(err.into()),
            Err(err) => {
                attempt += 1;
                let err: Error = err.into();
                debug!("Attempt {attempt}/{retries} failed: {err}. Retrying...");
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
