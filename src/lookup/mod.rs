//! Per-conversation system prompt retrieval.
//!
//! Some evaluations judge the bot against the exact instructions it ran with.
//! Their prompt template carries [`PROMPT_PLACEHOLDER`], which is replaced by
//! the instructions fetched for each conversation.

mod http;

pub use http::HttpPromptLookup;

use async_trait::async_trait;

use crate::error::JudgeError;

/// Token replaced by the looked-up instructions.
pub const PROMPT_PLACEHOLDER: &str = "@Prompt@";

/// Source of the system instructions a conversation ran with.
#[async_trait]
pub trait PromptLookup: Send + Sync {
    /// Returns the instructions for `key`, or
    /// [`JudgeError::PreconditionMissing`] when there are none.
    async fn fetch(&self, key: &str) -> Result<String, JudgeError>;
}

/// True when a template needs a lookup before it can be sent.
pub fn needs_lookup(template: &str) -> bool {
    template.contains(PROMPT_PLACEHOLDER)
}

pub fn fill_template(template: &str, instructions: &str) -> String {
    template.replace(PROMPT_PLACEHOLDER, instructions)
}
