use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

use crate::backends::{build_client, parse_base_url};
use crate::error::JudgeError;

use super::PromptLookup;

/// Fetches instructions from `GET {base_url}/{key}`.
#[derive(Debug, Clone)]
pub struct HttpPromptLookup {
    base_url: Url,
    client: Client,
}

impl HttpPromptLookup {
    pub fn new(base_url: &str, timeout_seconds: Option<u64>) -> Result<Self, JudgeError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            client: build_client(timeout_seconds)?,
        })
    }
}

/// Pulls instruction text out of the response shapes the endpoint has used.
fn extract_instructions(body: &Value) -> Option<&str> {
    let candidates = [
        body.pointer("/system/0/text"),
        body.pointer("/systemInstruction/parts/0/text"),
        body.get("systemInstruction"),
        body.get("text"),
    ];
    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|text| !text.trim().is_empty())
}

#[async_trait]
impl PromptLookup for HttpPromptLookup {
    async fn fetch(&self, key: &str) -> Result<String, JudgeError> {
        let url = self
            .base_url
            .join(key)
            .map_err(|e| JudgeError::InvalidRequest(format!("Bad lookup key {key:?}: {e}")))?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        log::debug!("Prompt lookup for {key} HTTP status: {status}");
        if !status.is_success() {
            return Err(JudgeError::PreconditionMissing(format!(
                "prompt lookup returned {status} for {key}"
            )));
        }
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).map_err(|e| {
            JudgeError::PreconditionMissing(format!("lookup response for {key} is not JSON: {e}"))
        })?;
        extract_instructions(&body)
            .map(str::to_string)
            .ok_or_else(|| {
                JudgeError::PreconditionMissing(format!("no system prompt in lookup response for {key}"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!({"system": [{"text": "be kind"}]}))]
    #[case(json!({"systemInstruction": {"parts": [{"text": "be kind"}]}}))]
    #[case(json!({"systemInstruction": "be kind"}))]
    #[case(json!({"text": "be kind"}))]
    fn accepts_known_shapes(#[case] body: Value) {
        assert_eq!(extract_instructions(&body), Some("be kind"));
    }

    #[test]
    fn rejects_unknown_shapes() {
        assert_eq!(extract_instructions(&json!({"prompt": "be kind"})), None);
        assert_eq!(extract_instructions(&json!({"text": "  "})), None);
    }
}
