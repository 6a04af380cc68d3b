//! Result artifacts keyed by (collection, kind, date).
//!
//! A key whose artifact already holds at least one row is considered done and
//! is never dispatched again.

mod artifact;
mod cache;
mod key;

pub use artifact::{ArtifactRow, ARTIFACT_COLUMNS};
pub use cache::CheckpointCache;
pub use key::CheckpointKey;

/// Default artifact root, relative to the working directory.
pub const DEFAULT_ROOT: &str = "outputs/llm_outputs";
