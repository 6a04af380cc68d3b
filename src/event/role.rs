use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::JudgeError;

static AGENT_LABEL: OnceLock<Regex> = OnceLock::new();

fn agent_label() -> &'static Regex {
    AGENT_LABEL
        .get_or_init(|| Regex::new(r"(?i)^agent(_\d+)?$").expect("agent label pattern is valid"))
}

/// Who sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    Consumer,
    Bot,
    Agent,
    System,
    Other,
}

impl SenderRole {
    /// Classifies a raw sender label.
    ///
    /// Any label mentioning "bot" counts as the bot; agents are `agent` or
    /// `agent_<n>`. Matching is case-insensitive.
    pub fn classify(label: &str) -> Self {
        let label = label.trim();
        let lower = label.to_lowercase();
        if lower.contains("bot") {
            SenderRole::Bot
        } else if agent_label().is_match(label) {
            SenderRole::Agent
        } else if lower == "consumer" || lower == "customer" {
            SenderRole::Consumer
        } else if lower == "system" {
            SenderRole::System
        } else {
            SenderRole::Other
        }
    }
}

impl fmt::Display for SenderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SenderRole::Consumer => "consumer",
            SenderRole::Bot => "bot",
            SenderRole::Agent => "agent",
            SenderRole::System => "system",
            SenderRole::Other => "other",
        };
        f.write_str(name)
    }
}

impl FromStr for SenderRole {
    type Err = JudgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "consumer" | "customer" => Ok(SenderRole::Consumer),
            "bot" => Ok(SenderRole::Bot),
            "agent" => Ok(SenderRole::Agent),
            "system" => Ok(SenderRole::System),
            _ => Err(JudgeError::ConfigError(format!("Unknown sender role: {s}"))),
        }
    }
}

/// Kind of a message row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Normal,
    Transfer,
    Private,
    Tool,
    Other,
}

impl MessageKind {
    pub fn classify(label: Option<&str>) -> Self {
        let Some(label) = label else {
            return MessageKind::Other;
        };
        match label.trim().to_lowercase().as_str() {
            "normal message" | "normal" => MessageKind::Normal,
            "transfer" => MessageKind::Transfer,
            "private message" | "private" => MessageKind::Private,
            "tool" => MessageKind::Tool,
            _ => MessageKind::Other,
        }
    }

    /// Transfers and private notes never reach the judge.
    pub fn is_hidden(self) -> bool {
        matches!(self, MessageKind::Transfer | MessageKind::Private)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Bot", SenderRole::Bot)]
    #[case("GPT_BOT", SenderRole::Bot)]
    #[case("Consumer", SenderRole::Consumer)]
    #[case("agent", SenderRole::Agent)]
    #[case("Agent_12", SenderRole::Agent)]
    #[case("Agent Smith", SenderRole::Other)]
    #[case(" SYSTEM ", SenderRole::System)]
    fn classifies_sender_labels(#[case] label: &str, #[case] expected: SenderRole) {
        assert_eq!(SenderRole::classify(label), expected);
    }

    #[rstest]
    #[case(Some("Normal Message"), MessageKind::Normal)]
    #[case(Some("TRANSFER"), MessageKind::Transfer)]
    #[case(Some("Private Message"), MessageKind::Private)]
    #[case(None, MessageKind::Other)]
    fn classifies_message_kinds(#[case] label: Option<&str>, #[case] expected: MessageKind) {
        assert_eq!(MessageKind::classify(label), expected);
    }

    #[test]
    fn parses_configured_roles() {
        assert_eq!("Bot".parse::<SenderRole>().ok(), Some(SenderRole::Bot));
        assert!("robot-ish".parse::<SenderRole>().is_err());
    }
}
