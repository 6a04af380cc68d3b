#[path = "normalizer/config.rs"]
mod config;

#[path = "normalizer/stats.rs"]
mod stats;

#[path = "normalizer/clean.rs"]
mod clean;

pub use clean::{validate_cleaning, Normalized, Normalizer};
pub use config::NormalizerConfig;
pub use stats::NormalizeStats;
