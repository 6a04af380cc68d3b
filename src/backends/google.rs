//! Google Gemini `generateContent` judge.
//!
//! Gemini takes the judge prompt and the conversation as one user turn.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::{
    error::JudgeError,
    provider::{JudgeProvider, JudgeReply, Usage},
};

use super::{build_client, log_request_payload, parse_base_url, send_and_parse};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const BASE_BUDGET: u32 = 20_000;

/// Configuration for the Google client.
#[derive(Debug)]
pub struct GoogleConfig {
    pub api_key: String,
    pub base_url: Url,
    pub model: String,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    /// When false, the thinking budget is pinned to zero.
    pub enable_thinking: bool,
    pub timeout_seconds: Option<u64>,
}

/// Client for Google's Gemini API.
#[derive(Debug, Clone)]
pub struct Google {
    pub config: Arc<GoogleConfig>,
    pub client: Client,
}

#[derive(Serialize)]
struct GoogleChatRequest<'a> {
    contents: Vec<GoogleContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GoogleGenerationConfig,
}

#[derive(Serialize)]
struct GoogleContent<'a> {
    role: &'a str,
    parts: Vec<GoogleRequestPart<'a>>,
}

#[derive(Serialize)]
struct GoogleRequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleGenerationConfig {
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<GoogleThinkingConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleThinkingConfig {
    include_thoughts: bool,
    thinking_budget: u32,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GoogleChatResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
    usage_metadata: Option<Usage>,
}

#[derive(Deserialize, Debug)]
struct GoogleCandidate {
    content: Option<GoogleResponseContent>,
}

#[derive(Deserialize, Debug)]
struct GoogleResponseContent {
    #[serde(default)]
    parts: Vec<GoogleResponsePart>,
}

#[derive(Deserialize, Debug)]
struct GoogleResponsePart {
    text: Option<String>,
}

impl GoogleChatResponse {
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        Some(text)
    }
}

impl Google {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<String>,
        model: Option<String>,
        temperature: Option<f32>,
        top_p: Option<f32>,
        top_k: Option<u32>,
        enable_thinking: bool,
        timeout_seconds: Option<u64>,
    ) -> Result<Self, JudgeError> {
        let client = build_client(timeout_seconds)?;
        let base_url = parse_base_url(base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;
        Ok(Self {
            config: Arc::new(GoogleConfig {
                api_key: api_key.into(),
                base_url,
                model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                temperature,
                top_p,
                top_k,
                enable_thinking,
                timeout_seconds,
            }),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn build_request<'a>(&self, combined: &'a str, max_output_tokens: u32) -> GoogleChatRequest<'a> {
        GoogleChatRequest {
            contents: vec![GoogleContent {
                role: "user",
                parts: vec![GoogleRequestPart { text: combined }],
            }],
            generation_config: GoogleGenerationConfig {
                max_output_tokens,
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                top_k: self.config.top_k,
                thinking_config: (!self.config.enable_thinking).then_some(GoogleThinkingConfig {
                    include_thoughts: false,
                    thinking_budget: 0,
                }),
            },
        }
    }
}

#[async_trait]
impl JudgeProvider for Google {
    async fn submit(
        &self,
        system: &str,
        user: &str,
        max_output_tokens: u32,
    ) -> Result<JudgeReply, JudgeError> {
        if self.config.api_key.is_empty() {
            return Err(JudgeError::AuthError("Missing Google API key".to_string()));
        }

        let combined = format!("{system}\n\nUser conversation:\n{user}");
        let body = self.build_request(&combined, max_output_tokens);
        log_request_payload("Google request payload", &body);

        let url = self
            .config
            .base_url
            .join(&format!("models/{}:generateContent", self.config.model))
            .map_err(|e| JudgeError::HttpError(e.to_string()))?;
        let request = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body);

        let response: GoogleChatResponse = send_and_parse(request, "Google generateContent").await?;
        Ok(JudgeReply::new(response.text(), response.usage_metadata))
    }

    fn base_budget(&self) -> u32 {
        BASE_BUDGET
    }

    fn name(&self) -> &str {
        "google"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disables_thinking_unless_enabled() {
        let judge = Google::new("key", None, None, Some(0.2), Some(1.0), Some(40), false, None).unwrap();
        let body = serde_json::to_value(judge.build_request("prompt", 512)).unwrap();
        let cfg = &body["generationConfig"];
        assert_eq!(cfg["maxOutputTokens"], 512);
        assert_eq!(cfg["topK"], 40);
        assert_eq!(cfg["thinkingConfig"]["thinkingBudget"], 0);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "prompt");

        let thinking = Google::new("key", None, None, None, None, None, true, None).unwrap();
        let body = serde_json::to_value(thinking.build_request("prompt", 512)).unwrap();
        assert!(body["generationConfig"].get("thinkingConfig").is_none());
        assert!(body["generationConfig"].get("temperature").is_none());
    }
}
