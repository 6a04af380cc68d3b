//! OpenAI chat completions judge.
//!
//! The judge prompt is sent as the system message and the serialized
//! conversation as the only user message.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::{
    error::JudgeError,
    provider::{JudgeProvider, JudgeReply, Usage},
};

use super::{build_client, log_request_payload, parse_base_url, send_and_parse};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";
pub const DEFAULT_MODEL: &str = "gpt-4o";

const STANDARD_BUDGET: u32 = 16_000;
const REASONING_BUDGET: u32 = 30_000;

/// Configuration for the OpenAI client.
#[derive(Debug)]
pub struct OpenAIConfig {
    /// API key for authentication with OpenAI.
    pub api_key: String,
    pub base_url: Url,
    pub model: String,
    /// Ignored by reasoning models, which only accept the default.
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
}

/// Client for OpenAI's chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAI {
    pub config: Arc<OpenAIConfig>,
    pub client: Client,
}

#[derive(Serialize)]
struct OpenAIChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize, Debug)]
struct OpenAIChatResponse {
    #[serde(default)]
    choices: Vec<OpenAIChatChoice>,
    usage: Option<Usage>,
}

#[derive(Deserialize, Debug)]
struct OpenAIChatChoice {
    message: OpenAIChatMsg,
}

#[derive(Deserialize, Debug)]
struct OpenAIChatMsg {
    content: Option<String>,
}

/// Reasoning models take `max_completion_tokens` and reject a temperature.
pub fn is_reasoning_model(model: &str) -> bool {
    let model = model.to_lowercase();
    ["o1", "o3", "o4"].iter().any(|p| model.starts_with(p))
}

impl OpenAI {
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<String>,
        model: Option<String>,
        temperature: Option<f32>,
        timeout_seconds: Option<u64>,
    ) -> Result<Self, JudgeError> {
        let client = build_client(timeout_seconds)?;
        Self::with_client(client, api_key, base_url, model, temperature, timeout_seconds)
    }

    /// Creates a new OpenAI client with a custom HTTP client.
    pub fn with_client(
        client: Client,
        api_key: impl Into<String>,
        base_url: Option<String>,
        model: Option<String>,
        temperature: Option<f32>,
        timeout_seconds: Option<u64>,
    ) -> Result<Self, JudgeError> {
        let base_url = parse_base_url(base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;
        Ok(Self {
            config: Arc::new(OpenAIConfig {
                api_key: api_key.into(),
                base_url,
                model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                temperature,
                timeout_seconds,
            }),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn build_request<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
        max_output_tokens: u32,
    ) -> OpenAIChatRequest<'a> {
        let reasoning = is_reasoning_model(&self.config.model);
        OpenAIChatRequest {
            model: &self.config.model,
            messages: vec![
                OpenAIChatMessage {
                    role: "system",
                    content: system,
                },
                OpenAIChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: (!reasoning).then_some(max_output_tokens),
            max_completion_tokens: reasoning.then_some(max_output_tokens),
            temperature: if reasoning { None } else { self.config.temperature },
        }
    }
}

#[async_trait]
impl JudgeProvider for OpenAI {
    async fn submit(
        &self,
        system: &str,
        user: &str,
        max_output_tokens: u32,
    ) -> Result<JudgeReply, JudgeError> {
        if self.config.api_key.is_empty() {
            return Err(JudgeError::AuthError("Missing OpenAI API key".to_string()));
        }

        let body = self.build_request(system, user, max_output_tokens);
        log_request_payload("OpenAI request payload", &body);

        let url = self
            .config
            .base_url
            .join("chat/completions")
            .map_err(|e| JudgeError::HttpError(e.to_string()))?;
        let request = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&body);

        let response: OpenAIChatResponse = send_and_parse(request, "OpenAI chat").await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);
        Ok(JudgeReply::new(content, response.usage))
    }

    fn base_budget(&self) -> u32 {
        if is_reasoning_model(&self.config.model) {
            REASONING_BUDGET
        } else {
            STANDARD_BUDGET
        }
    }

    fn name(&self) -> &str {
        "openai"
    }
}
