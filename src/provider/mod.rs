//! The capability every judge backend implements.

mod usage;

pub use usage::Usage;

use async_trait::async_trait;

use crate::error::JudgeError;

/// What a provider returned for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JudgeReply {
    /// Trimmed response text; `None` when the model produced nothing.
    pub content: Option<String>,
    pub usage: Option<Usage>,
}

impl JudgeReply {
    pub fn new(content: Option<String>, usage: Option<Usage>) -> Self {
        let content = content
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        Self { content, usage }
    }
}

/// A judge model behind one provider's wire format.
#[async_trait]
pub trait JudgeProvider: Send + Sync {
    /// Issues a single request. Retries and timeouts are the caller's concern.
    async fn submit(
        &self,
        system: &str,
        user: &str,
        max_output_tokens: u32,
    ) -> Result<JudgeReply, JudgeError>;

    /// Output budget for a first attempt with this provider and model.
    fn base_budget(&self) -> u32;

    /// Short provider name for logs.
    fn name(&self) -> &str;
}
