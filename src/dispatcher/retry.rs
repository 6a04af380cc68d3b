use std::time::Duration;

use rand::Rng;

use crate::error::JudgeError;

use super::config::DispatchConfig;

/// How the dispatcher reacts to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Transient; try again after the usual backoff
    Retryable,
    /// Throttled; try again after at least the rate-limit delay
    RateLimited,
    /// A precondition is missing; the request is not sent at all
    Skip,
    /// Retrying cannot help
    Terminal,
}

const RATE_LIMIT_MARKERS: &[&str] = &[
    "rate limit",
    "429",
    "too many requests",
    "insufficient_quota",
    "quota",
    "resource exhausted",
    "resource_exhausted",
];

const SERVER_MARKERS: &[&str] = &[
    "500",
    "502",
    "503",
    "504",
    "server error",
    "service unavailable",
];

fn sniff(message: &str) -> Option<ErrorClass> {
    let lower = message.to_lowercase();
    if RATE_LIMIT_MARKERS.iter().any(|m| lower.contains(m)) {
        Some(ErrorClass::RateLimited)
    } else if SERVER_MARKERS.iter().any(|m| lower.contains(m)) {
        Some(ErrorClass::Retryable)
    } else {
        None
    }
}

/// Maps an error to the dispatcher's reaction.
///
/// Errors without a status code (transport and provider messages) are checked
/// for throttling or server-failure wording.
pub fn classify(err: &JudgeError) -> ErrorClass {
    match err {
        JudgeError::RateLimited(_) => ErrorClass::RateLimited,
        JudgeError::Timeout(_) | JudgeError::ServerError { .. } => ErrorClass::Retryable,
        JudgeError::HttpError(msg) => sniff(msg).unwrap_or(ErrorClass::Retryable),
        JudgeError::ProviderError(msg) | JudgeError::Generic(msg) => {
            sniff(msg).unwrap_or(ErrorClass::Terminal)
        }
        JudgeError::PreconditionMissing(_) => ErrorClass::Skip,
        JudgeError::AuthError(_)
        | JudgeError::InvalidRequest(_)
        | JudgeError::ResponseFormatError { .. }
        | JudgeError::JsonError(_)
        | JudgeError::ConfigError(_)
        | JudgeError::Io(_)
        | JudgeError::Csv(_) => ErrorClass::Terminal,
    }
}

/// Output budget for an attempt. Every retry gets twice the first attempt's budget.
pub fn budget(base: u32, attempt: usize) -> u32 {
    if attempt > 0 {
        base.saturating_mul(2)
    } else {
        base
    }
}

/// Delay before the attempt following `attempt` (zero-based).
pub fn backoff_delay(cfg: &DispatchConfig, attempt: usize, class: ErrorClass) -> Duration {
    let mut delay = cfg
        .base_delay_ms
        .saturating_mul(1u64 << attempt.min(16));
    if cfg.jitter {
        let span = cfg.base_delay_ms.max(1);
        delay = delay.saturating_add(rand::thread_rng().gen_range(0..span));
    }
    delay = delay.min(cfg.max_delay_ms);
    if class == ErrorClass::RateLimited {
        delay = delay.max(cfg.rate_limit_min_delay_ms);
    }
    Duration::from_millis(delay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(JudgeError::RateLimited("slow".into()), ErrorClass::RateLimited)]
    #[case(JudgeError::Timeout("60s".into()), ErrorClass::Retryable)]
    #[case(JudgeError::ServerError { status: 502, message: "bad gateway".into() }, ErrorClass::Retryable)]
    #[case(JudgeError::HttpError("connection reset".into()), ErrorClass::Retryable)]
    #[case(JudgeError::ProviderError("Resource exhausted".into()), ErrorClass::RateLimited)]
    #[case(JudgeError::ProviderError("503 Service Unavailable".into()), ErrorClass::Retryable)]
    #[case(JudgeError::ProviderError("content policy".into()), ErrorClass::Terminal)]
    #[case(JudgeError::AuthError("bad key".into()), ErrorClass::Terminal)]
    #[case(JudgeError::InvalidRequest("context too long".into()), ErrorClass::Terminal)]
    #[case(JudgeError::PreconditionMissing("no prompt".into()), ErrorClass::Skip)]
    fn classifies_errors(#[case] err: JudgeError, #[case] expected: ErrorClass) {
        assert_eq!(classify(&err), expected);
    }

    #[test]
    fn retries_double_the_budget() {
        assert_eq!(budget(16_000, 0), 16_000);
        assert_eq!(budget(16_000, 1), 32_000);
        assert_eq!(budget(16_000, 2), 32_000);
    }

    #[test]
    fn backoff_grows_and_caps() {
        let cfg = DispatchConfig {
            jitter: false,
            ..DispatchConfig::default()
        };
        assert_eq!(backoff_delay(&cfg, 0, ErrorClass::Retryable), Duration::from_secs(1));
        assert_eq!(backoff_delay(&cfg, 1, ErrorClass::Retryable), Duration::from_secs(2));
        assert_eq!(backoff_delay(&cfg, 10, ErrorClass::Retryable), Duration::from_secs(30));
    }

    #[test]
    fn throttling_waits_at_least_the_rate_limit_delay() {
        let cfg = DispatchConfig::default();
        for attempt in 0..3 {
            let delay = backoff_delay(&cfg, attempt, ErrorClass::RateLimited);
            assert!(delay >= Duration::from_secs(5));
            assert!(delay <= Duration::from_secs(30));
        }
    }

    #[test]
    fn jitter_stays_within_one_base_delay() {
        let cfg = DispatchConfig::default();
        for _ in 0..50 {
            let delay = backoff_delay(&cfg, 1, ErrorClass::Retryable);
            assert!(delay >= Duration::from_millis(2_000));
            assert!(delay < Duration::from_millis(3_000));
        }
    }
}
