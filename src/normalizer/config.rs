use serde::{Deserialize, Serialize};

/// Options for record normalization.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Drop rows sent by human agents (`agent`, `agent_<n>`)
    pub strip_agent_messages: bool,
}
