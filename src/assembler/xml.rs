use serde_json::Value;

use crate::event::ToolOutput;

use super::walk::Entry;

/// Escapes the characters that would break element content.
pub(super) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        other => other.to_string(),
    }
}

fn opaque_tool(name: &str, body: &str) -> String {
    let body = if body.trim().is_empty() {
        "{}".to_string()
    } else {
        escape(body)
    };
    format!("<tool>\n  <n>{name}</n>\n  <o>{body}</o>\n</tool>")
}

fn render_tool(name: &str, output: &ToolOutput) -> String {
    let name = escape(name);
    match output {
        ToolOutput::Structured(Value::Object(map)) if !map.is_empty() => {
            let params: String = map
                .iter()
                .map(|(key, value)| {
                    let key = escape(key);
                    format!("  <{key}>{}</{key}>\n", escape(&scalar_text(value)))
                })
                .collect();
            format!("<tool>\n  <n>{name}</n>\n{params}</tool>")
        }
        ToolOutput::Structured(Value::Object(_)) | ToolOutput::Empty => opaque_tool(&name, ""),
        ToolOutput::Structured(value) => opaque_tool(&name, &scalar_text(value)),
        ToolOutput::Opaque(raw) => opaque_tool(&name, raw),
    }
}

fn render_entry(entry: &Entry) -> String {
    match entry {
        Entry::Tool { name, output, .. } => render_tool(name, output),
        Entry::Message {
            text, system: true, ..
        } => format!("[SYSTEM: {}]", escape(text)),
        Entry::Message { sender, text, .. } => format!("{}: {}", escape(sender), escape(text)),
    }
}

/// Renders the tagged transcript view. Returns `None` when nothing is left to show.
pub(super) fn render(conversation_id: &str, entries: &[Entry]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }
    let content = entries
        .iter()
        .map(render_entry)
        .collect::<Vec<_>>()
        .join("\n\n");
    Some(format!(
        "<conversation>\n<chatID>{}</chatID>\n<content>\n\n{content}\n\n</content>\n</conversation>",
        escape(conversation_id)
    ))
}
