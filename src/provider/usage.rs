use serde::{Deserialize, Serialize};

/// Token usage reported for one response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the prompt
    #[serde(alias = "input_tokens", alias = "promptTokenCount", default)]
    pub prompt_tokens: u32,
    /// Number of tokens in the completion
    #[serde(alias = "output_tokens", alias = "candidatesTokenCount", default)]
    pub completion_tokens: u32,
    /// Total number of tokens used
    #[serde(alias = "totalTokenCount", default)]
    pub total_tokens: u32,
}

impl Usage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32, total_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_either_provider_naming() {
        let openai: Usage =
            serde_json::from_str(r#"{"prompt_tokens": 10, "completion_tokens": 4, "total_tokens": 14}"#)
                .unwrap();
        let gemini: Usage = serde_json::from_str(
            r#"{"promptTokenCount": 10, "candidatesTokenCount": 4, "totalTokenCount": 14}"#,
        )
        .unwrap();
        assert_eq!(openai, gemini);
        assert_eq!(openai, Usage::new(10, 4, 14));
    }
}
