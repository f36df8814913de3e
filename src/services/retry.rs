// src/services/retry.rs
use log::warn;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Exponential backoff for provider requests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffConfig {
    pub min_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Multiplier applied after each failed attempt (>= 1).
    pub factor: u32,
    /// Random jitter percentage [0, 100] added to each delay.
    pub jitter_percent: u32,
    /// Retries after the first attempt.
    pub max_retries: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            min_backoff_ms: 500,
            max_backoff_ms: 8_000,
            factor: 2,
            jitter_percent: 20,
            max_retries: 3,
        }
    }
}

impl BackoffConfig {
    /// Base delay before retry number `attempt` (0-based), capped at the max.
    pub fn base_delay_ms(&self, attempt: u32) -> u64 {
        let factor = u64::from(self.factor.max(1));
        let mut delay = self.min_backoff_ms;
        for _ in 0..attempt {
            delay = delay.saturating_mul(factor);
            if delay >= self.max_backoff_ms {
                return self.max_backoff_ms;
            }
        }
        delay.min(self.max_backoff_ms)
    }
}

pub fn jitter_wait(base_ms: u64, jitter_percent: u32) -> u64 {
    let jitter_range = if jitter_percent == 0 {
        1
    } else {
        std::cmp::max(1, (base_ms.saturating_mul(u64::from(jitter_percent))) / 100)
    };
    let mut rng = rand::rng();
    base_ms + rng.random_range(0..jitter_range)
}

/// Runs `op` until it succeeds, fails permanently, or retries run out.
pub async fn retry_with_backoff<T, E, F, Fut, P>(
    config: &BackoffConfig,
    label: &str,
    is_transient: P,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < config.max_retries && is_transient(&e) => {
                let wait = jitter_wait(config.base_delay_ms(attempt), config.jitter_percent);
                warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {}ms",
                    label,
                    attempt + 1,
                    config.max_retries + 1,
                    e,
                    wait
                );
                tokio::time::sleep(Duration::from_millis(wait)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
