use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Concurrency, timeout and retry settings for a dispatch run.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Maximum number of conversations in flight at once
    pub concurrency_limit: usize,
    /// Maximum number of attempts including the first one, capped at
    /// [`ATTEMPT_CEILING`]
    pub max_attempts: usize,
    /// Wall-clock bound for a single attempt, in seconds
    pub attempt_timeout_seconds: u64,
    /// Initial backoff delay in milliseconds
    pub base_delay_ms: u64,
    /// Maximum backoff delay in milliseconds
    pub max_delay_ms: u64,
    /// Minimum delay after the provider throttled us, in milliseconds
    pub rate_limit_min_delay_ms: u64,
    /// Whether to add random jitter to backoff delays
    pub jitter: bool,
}

/// No request is ever attempted more often than this.
pub const ATTEMPT_CEILING: usize = 3;

const DEFAULT_CONCURRENCY_LIMIT: usize = 30;
const DEFAULT_MAX_ATTEMPTS: usize = 3;
const DEFAULT_ATTEMPT_TIMEOUT_SECONDS: u64 = 60;
const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
const DEFAULT_MAX_DELAY_MS: u64 = 30_000;
const DEFAULT_RATE_LIMIT_MIN_DELAY_MS: u64 = 5_000;

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            attempt_timeout_seconds: DEFAULT_ATTEMPT_TIMEOUT_SECONDS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            rate_limit_min_delay_ms: DEFAULT_RATE_LIMIT_MIN_DELAY_MS,
            jitter: true,
        }
    }
}

impl DispatchConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_seconds)
    }

    /// Effective attempt limit: `max_attempts` clamped to `1..=ATTEMPT_CEILING`.
    pub fn attempt_limit(&self) -> usize {
        self.max_attempts.clamp(1, ATTEMPT_CEILING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1)]
    #[case(2, 2)]
    #[case(3, 3)]
    #[case(10, 3)]
    fn attempt_limit_is_clamped(#[case] configured: usize, #[case] expected: usize) {
        let cfg = DispatchConfig {
            max_attempts: configured,
            ..DispatchConfig::default()
        };
        assert_eq!(cfg.attempt_limit(), expected);
    }
}
