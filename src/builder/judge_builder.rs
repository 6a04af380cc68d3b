use std::sync::Arc;

use secrecy::SecretString;

use crate::{error::JudgeError, provider::JudgeProvider};

use super::{backend::JudgeBackend, helpers, profile::ModelProfile, state::BuilderState};

/// Builder for configuring and instantiating judge providers.
///
/// Sampling values not set explicitly come from the model's [`ModelProfile`];
/// the backend is inferred from it too when not given.
#[derive(Default)]
pub struct JudgeBuilder {
    state: BuilderState,
}

impl JudgeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backend provider to use.
    pub fn backend(mut self, backend: JudgeBackend) -> Self {
        self.state.backend = Some(backend);
        self
    }

    /// Sets the API key for authentication.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.state.api_key = Some(SecretString::new(key.into()));
        self
    }

    /// Reads the API key from an environment variable, if set.
    pub fn api_key_from_env(mut self, var: &str) -> Self {
        match std::env::var(var) {
            Ok(key) => self.state.api_key = Some(SecretString::new(key)),
            Err(_) => log::debug!("API key variable {var} is not set"),
        }
        self
    }

    /// Sets the base URL for API requests.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.state.base_url = Some(url.into());
        self
    }

    /// Sets the model identifier to use.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.state.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.state.temperature = Some(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.state.top_p = Some(top_p);
        self
    }

    pub fn top_k(mut self, top_k: u32) -> Self {
        self.state.top_k = Some(top_k);
        self
    }

    /// Enables or disables model-side thinking where the backend supports it.
    pub fn enable_thinking(mut self, enable: bool) -> Self {
        self.state.enable_thinking = Some(enable);
        self
    }

    /// Sets the HTTP client timeout in seconds.
    pub fn timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.state.timeout_seconds = Some(timeout_seconds);
        self
    }

    /// The backend `build` would use.
    pub fn resolved_backend(&self) -> JudgeBackend {
        self.state.backend.unwrap_or_else(|| {
            let model = self.state.model.as_deref().unwrap_or_default();
            ModelProfile::for_model(model).backend
        })
    }

    pub fn build(mut self) -> Result<Arc<dyn JudgeProvider>, JudgeError> {
        helpers::log_builder_state(&self.state);
        let backend = self.resolved_backend();
        match backend {
            JudgeBackend::OpenAI => build_openai(&mut self.state),
            JudgeBackend::Google => build_google(&mut self.state),
        }
    }
}

fn profile_for(state: &BuilderState, default_model: &str) -> (String, ModelProfile) {
    let model = state
        .model
        .clone()
        .unwrap_or_else(|| default_model.to_string());
    let profile = ModelProfile::for_model(&model);
    (model, profile)
}

#[cfg(feature = "openai")]
fn build_openai(state: &mut BuilderState) -> Result<Arc<dyn JudgeProvider>, JudgeError> {
    let api_key = helpers::require_api_key(state, "OpenAI")?;
    let timeout = helpers::timeout_or_default(state);
    let (model, profile) = profile_for(state, crate::backends::openai::DEFAULT_MODEL);

    let provider = crate::backends::openai::OpenAI::new(
        api_key,
        state.base_url.take(),
        Some(model),
        Some(state.temperature.unwrap_or(profile.temperature)),
        timeout,
    )?;
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "openai"))]
fn build_openai(_state: &mut BuilderState) -> Result<Arc<dyn JudgeProvider>, JudgeError> {
    Err(JudgeError::InvalidRequest(
        "OpenAI feature not enabled".to_string(),
    ))
}

#[cfg(feature = "google")]
fn build_google(state: &mut BuilderState) -> Result<Arc<dyn JudgeProvider>, JudgeError> {
    let api_key = helpers::require_api_key(state, "Google")?;
    let timeout = helpers::timeout_or_default(state);
    let (model, profile) = profile_for(state, crate::backends::google::DEFAULT_MODEL);

    let provider = crate::backends::google::Google::new(
        api_key,
        state.base_url.take(),
        Some(model),
        Some(state.temperature.unwrap_or(profile.temperature)),
        state.top_p.or(profile.top_p),
        state.top_k.or(profile.top_k),
        state.enable_thinking.unwrap_or(profile.enable_thinking),
        timeout,
    )?;
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "google"))]
fn build_google(_state: &mut BuilderState) -> Result<Arc<dyn JudgeProvider>, JudgeError> {
    Err(JudgeError::InvalidRequest(
        "Google feature not enabled".to_string(),
    ))
}
