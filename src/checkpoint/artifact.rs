use serde::{Deserialize, Serialize};

use crate::dispatcher::EvaluationResult;

/// Column order of a result artifact.
pub const ARTIFACT_COLUMNS: [&str; 8] = [
    "conversation_id",
    "conversation",
    "llm_output",
    "status",
    "error",
    "attempts",
    "input_tokens",
    "output_tokens",
];

/// One line of a result artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRow {
    pub conversation_id: String,
    /// Payload the judge saw
    pub conversation: String,
    pub llm_output: String,
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
    pub attempts: usize,
    #[serde(default)]
    pub input_tokens: Option<u32>,
    #[serde(default)]
    pub output_tokens: Option<u32>,
}

impl ArtifactRow {
    /// Builds the row for `result`. With `pretty_json`, outputs that parse as
    /// JSON are re-indented.
    pub fn from_result(result: &EvaluationResult, conversation: &str, pretty_json: bool) -> Self {
        let output = result.outcome.output();
        let llm_output = if pretty_json {
            prettify(output).unwrap_or_else(|| output.to_string())
        } else {
            output.to_string()
        };
        Self {
            conversation_id: result.conversation_id.clone(),
            conversation: conversation.to_string(),
            llm_output,
            status: result.outcome.status().to_string(),
            error: result.outcome.error().map(str::to_string),
            attempts: result.attempts,
            input_tokens: result.usage.map(|u| u.prompt_tokens),
            output_tokens: result.usage.map(|u| u.completion_tokens),
        }
    }
}

fn prettify(output: &str) -> Option<String> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value: serde_json::Value = serde_json::from_str(trimmed).ok()?;
    serde_json::to_string_pretty(&value).ok()
}
