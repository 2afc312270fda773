//! Bounded retry for rate-limited provider calls.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use super::ProviderError;

/// A bounded retry policy with a fixed backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay between attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub const fn fixed(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// The provider rate-limit policy: 3 attempts, 5 seconds apart.
    pub const fn rate_limit_default() -> Self {
        Self::fixed(3, Duration::from_secs(5))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::rate_limit_default()
    }
}

/// Run a provider call, retrying on rate-limit responses.
///
/// Every other error passes through unchanged on the first occurrence.
/// Running out of attempts yields [`ProviderError::RetriesExhausted`].
pub async fn retry_on_rate_limit<T, F, Fut>(
    policy: &RetryPolicy,
    mut call: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match call().await {
            Err(ProviderError::RateLimited) => {
                if attempt >= policy.max_attempts {
                    return Err(ProviderError::RetriesExhausted(policy.max_attempts));
                }
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    backoff_secs = policy.backoff.as_secs_f32(),
                    "Rate limit exceeded, backing off"
                );
                sleep(policy.backoff).await;
            }
            other => return other,
        }
    }
}
