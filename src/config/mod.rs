//! File-based configuration for a judging run.
//!
//! Every section is optional; missing keys take their defaults.

mod load;
mod types;

pub use types::{CheckpointConfig, JudgeConfig, LoggingConfig, LookupConfig, ProviderConfig};
