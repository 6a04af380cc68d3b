//! Tabular row I/O for warehouse exports.
//!
//! Exports are CSV files with one message per row. Column headers are matched
//! after trimming whitespace, and absent or empty cells become `None`.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::JudgeError;
use crate::event::{format_timestamp, parse_timestamp, Event, ToolInvocation};

#[derive(Debug, Default, Deserialize, Serialize)]
struct ExportRow {
    #[serde(rename = "Conversation ID", default)]
    conversation_id: Option<String>,
    #[serde(rename = "Customer Name", default)]
    customer_name: Option<String>,
    #[serde(rename = "Message Sent Time", default)]
    sent_at: Option<String>,
    #[serde(rename = "Sent By", default)]
    sender: Option<String>,
    #[serde(rename = "TEXT", default)]
    text: Option<String>,
    #[serde(rename = "Skill", default)]
    skill: Option<String>,
    #[serde(rename = "Agent Name", default)]
    agent_name: Option<String>,
    #[serde(rename = "Message Type", default)]
    message_type: Option<String>,
    #[serde(rename = "Tools", default)]
    tool_name: Option<String>,
    #[serde(rename = "Tool Creation Date", default)]
    tool_created_at: Option<String>,
    #[serde(rename = "Tools Json Output", default)]
    tool_output: Option<String>,
    #[serde(rename = "Tool SUCCESS", default)]
    tool_success: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ExportRow {
    fn into_event(self, line: usize) -> Option<Event> {
        let conversation_id = non_empty(self.conversation_id)?;
        let sent_at = non_empty(self.sent_at).and_then(|raw| {
            let parsed = parse_timestamp(&raw);
            if parsed.is_none() {
                log::debug!("row {line}: unparseable send time {raw:?}");
            }
            parsed
        });
        let tool = ToolInvocation {
            name: non_empty(self.tool_name),
            output: non_empty(self.tool_output),
            created_at: non_empty(self.tool_created_at).and_then(|raw| parse_timestamp(&raw)),
            success: non_empty(self.tool_success),
        };
        Some(Event {
            conversation_id: conversation_id.trim().to_string(),
            customer_name: non_empty(self.customer_name),
            sent_at,
            sender: self.sender.unwrap_or_default(),
            text: non_empty(self.text),
            skill: non_empty(self.skill),
            agent_name: non_empty(self.agent_name),
            message_type: non_empty(self.message_type),
            tool: (!tool.is_blank()).then_some(tool),
        })
    }

    fn from_event(event: &Event) -> Self {
        let tool = event.tool.clone().unwrap_or_default();
        Self {
            conversation_id: Some(event.conversation_id.clone()),
            customer_name: event.customer_name.clone(),
            sent_at: event.sent_at.as_ref().map(format_timestamp),
            sender: Some(event.sender.clone()),
            text: event.text.clone(),
            skill: event.skill.clone(),
            agent_name: event.agent_name.clone(),
            message_type: event.message_type.clone(),
            tool_name: tool.name,
            tool_created_at: tool.created_at.as_ref().map(format_timestamp),
            tool_output: tool.output,
            tool_success: tool.success,
        }
    }
}

/// Reads export rows into events, in file order.
///
/// Rows without a conversation id cannot be attributed and are dropped.
pub fn read_events<R: Read>(reader: R) -> Result<Vec<Event>, JudgeError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let mut events = Vec::new();
    let mut dropped = 0usize;
    for (idx, row) in csv_reader.deserialize::<ExportRow>().enumerate() {
        match row?.into_event(idx + 2) {
            Some(event) => events.push(event),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        log::warn!("Dropped {dropped} export rows without a conversation id");
    }
    log::debug!("Read {} export rows", events.len());
    Ok(events)
}

pub fn read_events_from_path(path: impl AsRef<Path>) -> Result<Vec<Event>, JudgeError> {
    read_events(File::open(path)?)
}

/// Writes events back in export layout with normalized timestamps.
pub fn write_events<W: Write>(writer: W, events: &[Event]) -> Result<(), JudgeError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for event in events {
        csv_writer.serialize(ExportRow::from_event(event))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_events_to_path(path: impl AsRef<Path>, events: &[Event]) -> Result<(), JudgeError> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)?;
    }
    write_events(File::create(path)?, events)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\
 Conversation ID ,Message Sent Time,Sent By,TEXT,Message Type,Tools,Tool Creation Date,Tools Json Output
c-1,7/10/2025 3:50:36 PM,Consumer,hello,Normal Message,,,
c-1,7/10/2025 3:50:40 PM,Bot,checking,Normal Message,lookup_order,7/10/2025 3:50:39 PM,\"{\"\"status\"\": \"\"shipped\"\"}\"
,7/10/2025 3:51:00 PM,Bot,orphan,Normal Message,,,
";

    #[test]
    fn reads_rows_with_trimmed_headers() {
        let events = read_events(EXPORT.as_bytes()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].conversation_id, "c-1");
        assert!(events[0].tool.is_none());
        assert!(events[0].customer_name.is_none());

        let tool = events[1].tool.as_ref().unwrap();
        assert_eq!(tool.name.as_deref(), Some("lookup_order"));
        assert_eq!(tool.output.as_deref(), Some("{\"status\": \"shipped\"}"));
        assert!(tool.created_at.is_some());
    }

    #[test]
    fn written_rows_read_back_with_normalized_times() {
        let events = read_events(EXPORT.as_bytes()).unwrap();
        let mut out = Vec::new();
        write_events(&mut out, &events).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("2025-07-10 15:50:36"));
        assert_eq!(read_events(text.as_bytes()).unwrap(), events);
    }
}
