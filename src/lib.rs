//! Conversation normalization and concurrent LLM-judge evaluation.
//!
//! Raw chat export rows are cleaned by the [`normalizer`], grouped and
//! rendered by the [`assembler`], judged through a [`provider::JudgeProvider`]
//! by the [`dispatcher`], and persisted by the [`checkpoint`] cache so a key is
//! never judged twice. [`pipeline::Pipeline`] wires the stages together.

pub mod assembler;
pub mod backends;
pub mod builder;
pub mod checkpoint;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
#[cfg(feature = "logging")]
pub mod logging;
pub mod lookup;
pub mod normalizer;
pub mod pipeline;
pub mod provider;
pub mod source;

pub use builder::{JudgeBackend, JudgeBuilder};
pub use dispatcher::{Batch, Dispatcher, EvaluationRequest, EvaluationResult, Outcome};
pub use error::JudgeError;
pub use pipeline::{Pipeline, RunOutcome};
pub use provider::{JudgeProvider, JudgeReply, Usage};
