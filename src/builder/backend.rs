use crate::error::JudgeError;

/// Supported judge providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JudgeBackend {
    OpenAI,
    Google,
}

impl JudgeBackend {
    /// Environment variable holding this backend's API key.
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            JudgeBackend::OpenAI => "OPENAI_API_KEY",
            JudgeBackend::Google => "GEMINI_API_KEY",
        }
    }
}

impl std::str::FromStr for JudgeBackend {
    type Err = JudgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(JudgeBackend::OpenAI),
            "google" | "gemini" => Ok(JudgeBackend::Google),
            _ => Err(JudgeError::InvalidRequest(format!(
                "Unknown judge backend: {s}"
            ))),
        }
    }
}
