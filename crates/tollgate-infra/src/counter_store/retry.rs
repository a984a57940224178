//! Bounded retry loop shared by network-backed counter stores.

use std::future::Future;
use std::time::Duration;

use tollgate_core::ports::CounterStoreError;

/// Run `attempt` up to `attempts` times, sleeping `retry_delay * n` after the
/// n-th failure. `attempt` receives the 1-based attempt number.
///
/// Returns the first success, or `Transient` carrying the last error.
#[cfg_attr(not(feature = "redis"), allow(dead_code))]
pub(crate) async fn with_retries<T, F, Fut>(
    attempts: u32,
    retry_delay: Duration,
    key: &str,
    mut attempt: F,
) -> Result<T, CounterStoreError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, String>>,
{
    let attempts = attempts.max(1);
    let mut last_error = String::new();

    for n in 1..=attempts {
        match attempt(n).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::warn!(key = %key, attempt = n, error = %e, "Counter store call failed");
                last_error = e;
            }
        }

        if n < attempts {
            tokio::time::sleep(retry_delay * n).await;
        }
    }

    tracing::error!(
        key = %key,
        attempts,
        error = %last_error,
        "Counter store unavailable after retries"
    );

    Err(CounterStoreError::Transient {
        attempts,
        reason: last_error,
    })
}
