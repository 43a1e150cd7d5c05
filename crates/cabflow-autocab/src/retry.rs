//! Retry with exponential back-off and jitter for the AUTOCAB client.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors only: network failures, 429, and 5xx. Other 4xx
//! responses are never retried — 404 and 406 have bespoke handling in the
//! submission workflow and retrying them would only mask it.

use std::future::Future;
use std::time::Duration;

use crate::error::AutocabError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
pub(crate) fn is_retriable(err: &AutocabError) -> bool {
    match err {
        AutocabError::Http(e) => e.is_timeout() || e.is_connect(),
        AutocabError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
        AutocabError::NotFound(_)
        | AutocabError::Conflict(_)
        | AutocabError::Deserialize { .. }
        | AutocabError::InvalidSubmission(_) => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The delay before the n-th retry is `backoff_base_ms × 2^(n-1)` with ±25%
/// jitter, capped at 60 s. Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, AutocabError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AutocabError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "AUTOCAB transient error — retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
