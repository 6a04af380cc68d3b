//! Conversation events as read from warehouse exports.
//!
//! An [`Event`] is one message row, optionally carrying a [`ToolInvocation`]
//! side-effect. Sender and message kind are kept as the raw labels the export
//! used and classified on demand, so cleaned rows can be written back unchanged.

mod role;
mod timestamp;
mod tool;

pub use role::{MessageKind, SenderRole};
pub use timestamp::{format_timestamp, parse_timestamp};
pub use tool::{ToolInvocation, ToolKey, ToolOutput};

use std::collections::HashMap;

use chrono::NaiveDateTime;

/// One message (or tool attachment) within a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub conversation_id: String,
    pub customer_name: Option<String>,
    pub sent_at: Option<NaiveDateTime>,
    /// Raw sender label, e.g. `Bot`, `Consumer`, `Agent_2`.
    pub sender: String,
    pub text: Option<String>,
    pub skill: Option<String>,
    pub agent_name: Option<String>,
    /// Raw message type label, e.g. `Normal Message`.
    pub message_type: Option<String>,
    pub tool: Option<ToolInvocation>,
}

impl Event {
    /// Creates a plain message event with no optional fields set.
    pub fn message(
        conversation_id: impl Into<String>,
        sent_at: Option<NaiveDateTime>,
        sender: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            customer_name: None,
            sent_at,
            sender: sender.into(),
            text: Some(text.into()),
            skill: None,
            agent_name: None,
            message_type: Some("Normal Message".to_string()),
            tool: None,
        }
    }

    /// Attaches a tool invocation to this event.
    pub fn with_tool(mut self, tool: ToolInvocation) -> Self {
        self.tool = Some(tool);
        self
    }

    /// Sets the skill this message was routed through.
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skill = Some(skill.into());
        self
    }

    /// Sets the raw message type label.
    pub fn with_message_type(mut self, message_type: impl Into<String>) -> Self {
        self.message_type = Some(message_type.into());
        self
    }

    pub fn role(&self) -> SenderRole {
        SenderRole::classify(&self.sender)
    }

    /// True when the sender label is literally the role's name, ignoring case.
    /// Unlike [`Event::role`], `GPT_BOT` is not sent by [`SenderRole::Bot`].
    pub fn sent_by(&self, role: SenderRole) -> bool {
        self.sender.trim().eq_ignore_ascii_case(&role.to_string())
    }

    pub fn kind(&self) -> MessageKind {
        MessageKind::classify(self.message_type.as_deref())
    }

    /// Grouping key of the attached tool call, if any.
    pub fn tool_key(&self) -> Option<ToolKey> {
        self.tool.as_ref().map(ToolInvocation::key)
    }

    /// Key of the attached tool call when it has a creation time. Calls
    /// without one cannot be ranked against send times and are never merged.
    pub fn attributable_tool_key(&self) -> Option<ToolKey> {
        self.tool_key().filter(|key| key.created_at.is_some())
    }
}

/// Splits rows by conversation id, keeping first-appearance order of both
/// conversations and rows.
pub fn group_by_conversation(events: Vec<Event>) -> Vec<Vec<Event>> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<Event>> = Vec::new();
    for event in events {
        let slot = *index
            .entry(event.conversation_id.clone())
            .or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
        groups[slot].push(event);
    }
    groups
}

/// Stable chronological sort.
///
/// Rows without a usable timestamp inherit the timestamp of the closest
/// preceding row, so they stay next to the rows they followed in the input.
pub fn sort_chronologically(events: &mut Vec<Event>) {
    let mut carried: Option<NaiveDateTime> = None;
    let mut keyed: Vec<(Option<NaiveDateTime>, Event)> = events
        .drain(..)
        .map(|event| {
            if event.sent_at.is_some() {
                carried = event.sent_at;
            }
            (carried, event)
        })
        .collect();
    keyed.sort_by_key(|(key, _)| *key);
    events.extend(keyed.into_iter().map(|(_, event)| event));
}
