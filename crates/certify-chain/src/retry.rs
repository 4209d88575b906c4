//! Retry with exponential backoff for idempotent JSON-RPC reads.
//!
//! Only transport failures (connection refused, timeouts) are retried. HTTP
//! status errors, JSON-RPC error objects, and malformed responses are
//! returned immediately. Transactions never go through this path.

use std::future::Future;
use std::time::Duration;

use crate::error::ChainError;

/// Maximum number of retry attempts after the initial request.
pub(crate) const MAX_RETRIES: u32 = 3;

/// Base delay between retries (doubles each attempt: 200ms, 400ms, 800ms).
const BASE_DELAY_MS: u64 = 200;

/// Run `f`, retrying transport failures with backoff.
pub(crate) async fn retry_read<F, Fut, T>(method: &str, f: F) -> Result<T, ChainError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ChainError>>,
{
    for attempt in 0..MAX_RETRIES {
        match f().await {
            Err(e) if e.is_transport() => {
                let delay = Duration::from_millis(BASE_DELAY_MS * 2u64.pow(attempt));
                tracing::warn!(
                    method,
                    attempt = attempt + 1,
                    max_retries = MAX_RETRIES,
                    "RPC request failed, retrying in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
            }
            other => return other,
        }
    }
    // Final attempt, no more retries.
    f().await
}
