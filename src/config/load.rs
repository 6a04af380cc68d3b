use std::fs;
use std::path::Path;

use crate::error::JudgeError;

use super::types::JudgeConfig;

impl JudgeConfig {
    /// Loads a TOML or YAML file, chosen by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, JudgeError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        let config = match extension.as_deref() {
            Some("toml") => Self::from_toml(&contents)?,
            Some("yaml") | Some("yml") => Self::from_yaml(&contents)?,
            _ => {
                return Err(JudgeError::ConfigError(format!(
                    "unsupported config format: {}",
                    path.display()
                )))
            }
        };
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, JudgeError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, JudgeError> {
        Ok(serde_yaml::from_str(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::ViewFormat;
    use crate::event::SenderRole;
    use tempfile::TempDir;

    #[test]
    fn missing_sections_take_defaults() {
        let config = JudgeConfig::from_toml(
            r#"
[provider]
model = "gemini-2.5-flash"

[dispatch]
concurrency_limit = 8
"#,
        )
        .unwrap();

        assert_eq!(config.provider.model, "gemini-2.5-flash");
        assert_eq!(config.dispatch.concurrency_limit, 8);
        assert_eq!(config.dispatch.max_attempts, 3);
        assert_eq!(config.dispatch.rate_limit_min_delay_ms, 5_000);
        assert_eq!(config.assembler.format, ViewFormat::Xml);
        assert_eq!(
            config.assembler.required_roles,
            vec![SenderRole::Bot, SenderRole::Consumer]
        );
        assert_eq!(config.checkpoint.root, Path::new("outputs/llm_outputs"));
        assert_eq!(config.logging.level, "info");
        assert!(config.lookup.build().unwrap().is_none());
    }

    #[test]
    fn loads_yaml_by_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("judge.yml");
        fs::write(
            &path,
            "assembler:\n  format: json\n  target_skills: [Sales]\nnormalizer:\n  strip_agent_messages: true\n",
        )
        .unwrap();

        let config = JudgeConfig::load(&path).unwrap();

        assert_eq!(config.assembler.format, ViewFormat::Json);
        assert_eq!(config.assembler.target_skills, Some(vec!["Sales".to_string()]));
        assert!(config.normalizer.strip_agent_messages);
    }

    #[test]
    fn rejects_unknown_extensions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("judge.ini");
        fs::write(&path, "").unwrap();

        assert!(matches!(
            JudgeConfig::load(&path),
            Err(JudgeError::ConfigError(_))
        ));
    }

    #[test]
    fn provider_reads_key_from_named_variable() {
        std::env::set_var("LLM_JUDGE_CONFIG_TEST_KEY", "test-key");
        let config = JudgeConfig::from_toml(
            r#"
[provider]
model = "o4-mini"
api_key_env = "LLM_JUDGE_CONFIG_TEST_KEY"
"#,
        )
        .unwrap();

        let provider = config.provider.build().unwrap();

        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.base_budget(), 30_000);
    }

    #[test]
    fn provider_without_key_fails_before_any_request() {
        let config = JudgeConfig::from_toml(
            r#"
[provider]
model = "gpt-4o"
api_key_env = "LLM_JUDGE_CONFIG_TEST_UNSET"
"#,
        )
        .unwrap();

        assert!(matches!(
            config.provider.build(),
            Err(JudgeError::AuthError(_))
        ));
    }
}
