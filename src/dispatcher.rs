//! Evaluation dispatch: bounded concurrency, per-attempt timeouts and retries.
//!
//! Every request that reaches the provider yields exactly one
//! [`EvaluationResult`]; requests whose prompt lookup produced nothing are
//! reported as [`Skipped`] instead.

#[path = "dispatcher/config.rs"]
mod config;

#[path = "dispatcher/retry.rs"]
mod retry;

#[path = "dispatcher/usage.rs"]
mod usage;

#[path = "dispatcher/types.rs"]
mod types;

#[path = "dispatcher/engine.rs"]
mod engine;

pub use config::{DispatchConfig, ATTEMPT_CEILING};
pub use engine::Dispatcher;
pub use retry::{backoff_delay, budget, classify, ErrorClass};
pub use types::{
    Batch, DispatchReport, EvaluationRequest, EvaluationResult, Outcome, RunSummary, SkipReason,
    Skipped, EMPTY_MARKER,
};
pub use usage::{UsageMeter, UsageSnapshot};
