use chrono::NaiveDateTime;
use serde_json::Value;

/// A tool call the bot made, as attached to a message row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolInvocation {
    pub name: Option<String>,
    /// Raw output payload, usually JSON.
    pub output: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub success: Option<String>,
}

/// Identity of a tool call: two rows carrying equal keys describe the same call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ToolKey {
    pub created_at: Option<NaiveDateTime>,
    pub name: Option<String>,
    pub output: Option<String>,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, output: impl Into<String>, created_at: NaiveDateTime) -> Self {
        Self {
            name: Some(name.into()),
            output: Some(output.into()),
            created_at: Some(created_at),
            success: None,
        }
    }

    pub fn key(&self) -> ToolKey {
        ToolKey {
            created_at: self.created_at,
            name: self.name.clone(),
            output: self.output.clone(),
        }
    }

    /// True when none of the tool columns carried a value.
    pub fn is_blank(&self) -> bool {
        self.name.is_none()
            && self.output.is_none()
            && self.created_at.is_none()
            && self.success.is_none()
    }

    pub fn parsed_output(&self) -> ToolOutput {
        ToolOutput::parse(self.output.as_deref())
    }
}

/// Tool output payload after a lenient JSON parse.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Empty,
    Structured(Value),
    /// Not valid JSON; kept verbatim.
    Opaque(String),
}

impl ToolOutput {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return ToolOutput::Empty;
        };
        let cleaned: String = raw
            .chars()
            .filter(|c| !matches!(c, '\u{202f}' | '\u{00a0}'))
            .collect();
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return ToolOutput::Empty;
        }
        match serde_json::from_str(cleaned) {
            Ok(value) => ToolOutput::Structured(value),
            Err(err) => {
                log::trace!("tool output is not JSON ({err}); keeping raw text");
                ToolOutput::Opaque(raw.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_structured_output() {
        assert_eq!(
            ToolOutput::parse(Some("{\"Team\": \"Billing\"}")),
            ToolOutput::Structured(json!({"Team": "Billing"}))
        );
    }

    #[test]
    fn keeps_invalid_json_verbatim() {
        assert_eq!(
            ToolOutput::parse(Some("status=ok")),
            ToolOutput::Opaque("status=ok".to_string())
        );
    }

    #[test]
    fn blank_output_is_empty() {
        assert_eq!(ToolOutput::parse(Some(" \u{a0} ")), ToolOutput::Empty);
        assert_eq!(ToolOutput::parse(None), ToolOutput::Empty);
    }
}
