use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    assembler::AssemblerConfig,
    builder::{JudgeBackend, JudgeBuilder},
    checkpoint::{CheckpointCache, DEFAULT_ROOT},
    dispatcher::DispatchConfig,
    error::JudgeError,
    lookup::{HttpPromptLookup, PromptLookup},
    normalizer::NormalizerConfig,
    provider::JudgeProvider,
};

const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_LOG_ROTATE_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_LOG_ROTATE_KEEP: usize = 5;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct JudgeConfig {
    pub provider: ProviderConfig,
    pub dispatch: DispatchConfig,
    pub normalizer: NormalizerConfig,
    pub assembler: AssemblerConfig,
    pub lookup: LookupConfig,
    pub checkpoint: CheckpointConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub model: String,
    /// `openai` or `google`; inferred from the model when absent
    pub backend: Option<String>,
    /// Environment variable holding the API key; defaults per backend
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub temperature: Option<f32>,
    pub enable_thinking: Option<bool>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            backend: None,
            api_key_env: None,
            base_url: None,
            timeout_seconds: None,
            temperature: None,
            enable_thinking: None,
        }
    }
}

impl ProviderConfig {
    /// Prepares a builder with the key read from the environment.
    pub fn builder(&self) -> Result<JudgeBuilder, JudgeError> {
        let mut builder = JudgeBuilder::new().model(&self.model);
        if let Some(backend) = &self.backend {
            builder = builder.backend(backend.parse::<JudgeBackend>()?);
        }
        let key_var = self
            .api_key_env
            .clone()
            .unwrap_or_else(|| builder.resolved_backend().default_api_key_env().to_string());
        builder = builder.api_key_from_env(&key_var);
        if let Some(url) = &self.base_url {
            builder = builder.base_url(url);
        }
        if let Some(timeout) = self.timeout_seconds {
            builder = builder.timeout_seconds(timeout);
        }
        if let Some(temperature) = self.temperature {
            builder = builder.temperature(temperature);
        }
        if let Some(enable) = self.enable_thinking {
            builder = builder.enable_thinking(enable);
        }
        Ok(builder)
    }

    /// Builds the provider. A missing API key fails here, before any request.
    pub fn build(&self) -> Result<Arc<dyn JudgeProvider>, JudgeError> {
        self.builder()?.build()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Endpoint serving per-conversation system prompts
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl LookupConfig {
    pub fn build(&self) -> Result<Option<Arc<dyn PromptLookup>>, JudgeError> {
        match &self.base_url {
            Some(url) => {
                let lookup = HttpPromptLookup::new(url, self.timeout_seconds)?;
                Ok(Some(Arc::new(lookup)))
            }
            None => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CheckpointConfig {
    pub root: PathBuf,
    pub pretty_json: bool,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            pretty_json: false,
        }
    }
}

impl CheckpointConfig {
    pub fn cache(&self) -> CheckpointCache {
        CheckpointCache::new(&self.root).pretty_json(self.pretty_json)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub path: Option<String>,
    pub rotate_size: u64,
    pub rotate_keep: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            path: None,
            rotate_size: DEFAULT_LOG_ROTATE_SIZE,
            rotate_keep: DEFAULT_LOG_ROTATE_KEEP,
        }
    }
}
