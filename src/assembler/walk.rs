use chrono::NaiveDateTime;

use crate::event::{MessageKind, SenderRole, ToolOutput};

use super::config::AssemblerConfig;
use super::conversation::Conversation;

const DOC_PLACEHOLDER: &str = "[Doc/Image]";
const OFF_SKILL_BOT_LABEL: &str = "Agent_1";

/// One rendered item of a conversation view.
pub(super) enum Entry {
    Tool {
        sender: String,
        name: String,
        output: ToolOutput,
        created_at: Option<NaiveDateTime>,
    },
    Message {
        sender: String,
        sent_at: Option<NaiveDateTime>,
        kind_label: String,
        text: String,
        system: bool,
    },
}

/// Rendered entries of a conversation plus the skill of its last rendered message.
pub(super) struct View {
    pub(super) entries: Vec<Entry>,
    pub(super) last_skill: Option<String>,
}

#[derive(PartialEq)]
struct Seen {
    sent_at: Option<NaiveDateTime>,
    text: String,
    sender: String,
    kind_label: String,
}

/// Applies the view rules shared by every format.
///
/// Transfers and private notes are hidden, off-skill bot rows are relabelled,
/// blank normal messages become a document placeholder, and a message equal
/// to the previous rendered one is suppressed. Named tool attachments are
/// always kept.
pub(super) fn walk(conv: &Conversation, cfg: &AssemblerConfig, include_system: bool) -> View {
    let mut entries = Vec::new();
    let mut last: Option<Seen> = None;
    let mut last_skill: Option<String> = None;

    for event in &conv.events {
        let kind = event.kind();
        if kind.is_hidden() {
            continue;
        }
        let role = event.role();
        if role == SenderRole::System && !include_system {
            continue;
        }

        let sender = if role == SenderRole::Bot
            && cfg.target_skills.is_some()
            && !cfg.is_target_skill(event.skill.as_deref())
        {
            OFF_SKILL_BOT_LABEL.to_string()
        } else {
            event.sender.clone()
        };
        let kind_label = event
            .message_type
            .as_deref()
            .map(|t| t.trim().to_lowercase())
            .unwrap_or_default();
        let mut text = event.text.clone().unwrap_or_default();
        if text.is_empty() && kind == MessageKind::Normal {
            text = DOC_PLACEHOLDER.to_string();
        }

        let current = Seen {
            sent_at: event.sent_at,
            text,
            sender,
            kind_label,
        };
        let duplicate = last.as_ref() == Some(&current);

        if let Some((tool, name)) = event
            .tool
            .as_ref()
            .and_then(|tool| tool.name.as_ref().map(|name| (tool, name)))
        {
            entries.push(Entry::Tool {
                sender: current.sender.clone(),
                name: name.clone(),
                output: tool.parsed_output(),
                created_at: tool.created_at,
            });
        }

        if !current.text.is_empty() && !duplicate {
            entries.push(Entry::Message {
                sender: current.sender.clone(),
                sent_at: current.sent_at,
                kind_label: current.kind_label.clone(),
                text: current.text.clone(),
                system: role == SenderRole::System,
            });
            if let Some(skill) = event.skill.as_deref().filter(|s| !s.trim().is_empty()) {
                last_skill = Some(skill.to_string());
            }
            last = Some(current);
        }
    }
    View { entries, last_skill }
}
