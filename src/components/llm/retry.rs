use crate::config::SchedulingConfig;
use crate::error::{AppResult, Error};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Upper bound on any server-suggested wait
const MAX_SERVER_DELAY: Duration = Duration::from_secs(60);

/// How long to wait before a retry when the server gives no hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDelay {
    /// Same delay before every retry
    Fixed(Duration),
    /// `initial * 2^(retry - 1)`, capped at `max`
    Exponential { initial: Duration, max: Duration },
}

/// Bounded retry of rate-limited calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub delay: RetryDelay,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay: RetryDelay::Fixed(Duration::from_secs(2)),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: RetryDelay) -> Self {
        Self { max_retries, delay }
    }

    /// Never retry
    pub fn none() -> Self {
        Self::new(0, RetryDelay::Fixed(Duration::ZERO))
    }

    pub fn from_config(config: &SchedulingConfig) -> Self {
        Self::new(
            config.llm_max_retries,
            RetryDelay::Fixed(Duration::from_millis(config.llm_retry_delay_ms)),
        )
    }

    /// Delay before retry number `retry` (1-based). A server hint wins when present.
    pub fn delay_for(&self, retry: u32, server_hint: Option<Duration>) -> Duration {
        if let Some(hint) = server_hint {
            return hint.min(MAX_SERVER_DELAY);
        }
        match self.delay {
            RetryDelay::Fixed(delay) => delay,
            RetryDelay::Exponential { initial, max } => {
                let factor = 2u32.saturating_pow(retry.saturating_sub(1));
                initial.saturating_mul(factor).min(max)
            }
        }
    }

    /// Run `operation`, retrying only on [`Error::RateLimited`]
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let mut retries = 0;
        loop {
            match operation().await {
                Err(Error::RateLimited { retry_after }) if retries < self.max_retries => {
                    retries += 1;
                    let delay = self.delay_for(retries, retry_after);
                    warn!(
                        "Rate limited, retry {}/{} in {:?}",
                        retries, self.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }
}

/// Parse a `Retry-After` header given in (possibly fractional) seconds
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let seconds = value.trim().parse::<f64>().ok()?;
    // Rejects negative, NaN and values past Duration::MAX
    Duration::try_from_secs_f64(seconds).ok()
}

/// Parse a protobuf-style duration such as `"31s"` or `"1.5s"`
pub fn parse_seconds_suffix(value: &str) -> Option<Duration> {
    parse_retry_after(value.trim().strip_suffix('s')?)
}
