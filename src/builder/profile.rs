use super::backend::JudgeBackend;

/// Sampling defaults for a known judge model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelProfile {
    pub backend: JudgeBackend,
    pub temperature: f32,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub enable_thinking: bool,
}

impl ModelProfile {
    const fn deterministic(backend: JudgeBackend) -> Self {
        Self {
            backend,
            temperature: 0.0,
            top_p: None,
            top_k: None,
            enable_thinking: true,
        }
    }

    /// Looks up a model's profile. Unknown models are routed by name prefix
    /// and judged deterministically.
    pub fn for_model(model: &str) -> Self {
        match model {
            "gemini-2.5-flash" => Self {
                backend: JudgeBackend::Google,
                temperature: 0.2,
                top_p: Some(1.0),
                top_k: Some(40),
                enable_thinking: false,
            },
            "gpt-4o" | "gpt-4o-mini" | "o4-mini" => Self::deterministic(JudgeBackend::OpenAI),
            "gemini-1.5-pro" | "gemini-1.5-flash" | "gemini-2.0-flash-exp" | "gemini-2.5-pro" => {
                Self::deterministic(JudgeBackend::Google)
            }
            other if other.to_lowercase().starts_with("gemini") => {
                Self::deterministic(JudgeBackend::Google)
            }
            _ => Self::deterministic(JudgeBackend::OpenAI),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_profile_disables_thinking() {
        let profile = ModelProfile::for_model("gemini-2.5-flash");
        assert_eq!(profile.backend, JudgeBackend::Google);
        assert_eq!(profile.top_k, Some(40));
        assert!(!profile.enable_thinking);
    }

    #[test]
    fn unknown_models_route_by_prefix() {
        assert_eq!(ModelProfile::for_model("gemini-3.0-ultra").backend, JudgeBackend::Google);
        assert_eq!(ModelProfile::for_model("gpt-5").backend, JudgeBackend::OpenAI);
    }
}
