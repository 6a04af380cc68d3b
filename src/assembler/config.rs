use serde::{Deserialize, Serialize};

use crate::event::SenderRole;

/// Serialization used for the payload handed to the judge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewFormat {
    #[default]
    Xml,
    Json,
}

/// Inclusion and rendering rules for assembled conversations.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct AssemblerConfig {
    pub format: ViewFormat,
    /// Skills that mark a conversation as in scope. `None` keeps every
    /// conversation and renders bot rows as-is.
    pub target_skills: Option<Vec<String>>,
    /// Roles that must all have spoken for a conversation to be eligible
    pub required_roles: Vec<SenderRole>,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            format: ViewFormat::Xml,
            target_skills: None,
            required_roles: vec![SenderRole::Bot, SenderRole::Consumer],
        }
    }
}

impl AssemblerConfig {
    pub(crate) fn is_target_skill(&self, skill: Option<&str>) -> bool {
        match (&self.target_skills, skill) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(targets), Some(skill)) => targets.iter().any(|t| t.eq_ignore_ascii_case(skill.trim())),
        }
    }
}
