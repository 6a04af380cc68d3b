use secrecy::ExposeSecret;

use crate::error::JudgeError;

use super::state::BuilderState;

const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

pub(super) fn log_builder_state(state: &BuilderState) {
    log::debug!(
        "Building judge provider. backend={:?} model={:?} temp={:?} top_p={:?} top_k={:?} thinking={:?}",
        state.backend,
        state.model,
        state.temperature,
        state.top_p,
        state.top_k,
        state.enable_thinking,
    );
}

pub(super) fn require_api_key(
    state: &mut BuilderState,
    provider: &str,
) -> Result<String, JudgeError> {
    let Some(key) = state.api_key.take() else {
        return Err(JudgeError::AuthError(format!(
            "No API key provided for {provider}"
        )));
    };
    if key.expose_secret().trim().is_empty() {
        return Err(JudgeError::AuthError(format!(
            "Empty API key provided for {provider}"
        )));
    }
    Ok(key.expose_secret().to_string())
}

pub(super) fn timeout_or_default(state: &BuilderState) -> Option<u64> {
    Some(state.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
}
