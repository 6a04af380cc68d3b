use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

use crate::error::JudgeError;
use crate::event::ToolOutput;

use super::walk::Entry;

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Serialize)]
struct JsonConversation<'a> {
    customer_name: &'a str,
    chat_id: &'a str,
    conversation: Vec<JsonEntry<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum JsonEntry<'a> {
    Tool {
        timestamp: Option<String>,
        sender: &'a str,
        #[serde(rename = "type")]
        kind: &'static str,
        tool: &'a str,
        result: Value,
    },
    Message {
        timestamp: Option<String>,
        sender: &'a str,
        #[serde(rename = "type")]
        kind: &'a str,
        content: &'a str,
    },
}

fn iso(ts: &Option<NaiveDateTime>) -> Option<String> {
    ts.as_ref().map(|t| t.format(ISO_FORMAT).to_string())
}

fn result_value(output: &ToolOutput) -> Value {
    match output {
        ToolOutput::Empty => Value::Object(Default::default()),
        ToolOutput::Structured(value) => value.clone(),
        ToolOutput::Opaque(raw) => Value::String(raw.clone()),
    }
}

/// Renders the structured JSON view. Returns `Ok(None)` when nothing is left to show.
pub(super) fn render(
    conversation_id: &str,
    customer_name: Option<&str>,
    entries: &[Entry],
) -> Result<Option<String>, JudgeError> {
    if entries.is_empty() {
        return Ok(None);
    }
    let conversation = entries
        .iter()
        .map(|entry| match entry {
            Entry::Tool {
                sender,
                name,
                output,
                created_at,
            } => JsonEntry::Tool {
                timestamp: iso(created_at),
                sender,
                kind: "tool",
                tool: name,
                result: result_value(output),
            },
            Entry::Message {
                sender,
                sent_at,
                kind_label,
                text,
                ..
            } => JsonEntry::Message {
                timestamp: iso(sent_at),
                sender,
                kind: kind_label,
                content: text,
            },
        })
        .collect();
    let view = JsonConversation {
        customer_name: customer_name.unwrap_or("Unknown"),
        chat_id: conversation_id,
        conversation,
    };
    Ok(Some(serde_json::to_string_pretty(&view)?))
}
