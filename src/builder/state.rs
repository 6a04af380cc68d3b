use secrecy::SecretString;

use super::backend::JudgeBackend;

#[derive(Default)]
pub(crate) struct BuilderState {
    pub(crate) backend: Option<JudgeBackend>,
    pub(crate) api_key: Option<SecretString>,
    pub(crate) base_url: Option<String>,
    pub(crate) model: Option<String>,
    pub(crate) temperature: Option<f32>,
    pub(crate) top_p: Option<f32>,
    pub(crate) top_k: Option<u32>,
    pub(crate) enable_thinking: Option<bool>,
    pub(crate) timeout_seconds: Option<u64>,
}
