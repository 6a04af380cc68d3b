use crate::error::JudgeError;
use crate::event::Event;

use super::config::{AssemblerConfig, ViewFormat};
use super::conversation::Conversation;
use super::{json, walk, xml};

/// A conversation rendered into the opaque payload the judge receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedConversation {
    pub conversation_id: String,
    pub payload: String,
    pub last_skill: Option<String>,
}

/// Builds judge payloads from normalized events.
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    cfg: AssemblerConfig,
}

impl Assembler {
    pub fn new(cfg: AssemblerConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.cfg
    }

    /// Groups, filters and serializes conversations, in first-appearance order.
    pub fn assemble(&self, events: Vec<Event>) -> Result<Vec<SerializedConversation>, JudgeError> {
        let conversations = Conversation::group(events);
        let total = conversations.len();
        let mut out = Vec::with_capacity(total);
        let (mut off_skill, mut missing_roles, mut empty) = (0usize, 0usize, 0usize);

        for conv in &conversations {
            if !self.in_scope(conv) {
                off_skill += 1;
                continue;
            }
            if !conv.has_roles(&self.cfg.required_roles) {
                missing_roles += 1;
                continue;
            }
            match self.serialize(conv)? {
                Some(serialized) => out.push(serialized),
                None => empty += 1,
            }
        }

        log::debug!(
            "Assembled {} of {total} conversations ({off_skill} out of scope, {missing_roles} missing participants, {empty} empty)",
            out.len()
        );
        Ok(out)
    }

    /// Serializes one conversation without applying inclusion rules.
    pub fn serialize(&self, conv: &Conversation) -> Result<Option<SerializedConversation>, JudgeError> {
        let view = walk::walk(conv, &self.cfg, self.cfg.format == ViewFormat::Xml);
        let payload = match self.cfg.format {
            ViewFormat::Xml => xml::render(&conv.id, &view.entries),
            ViewFormat::Json => json::render(&conv.id, conv.customer_name.as_deref(), &view.entries)?,
        };
        Ok(payload.map(|payload| SerializedConversation {
            conversation_id: conv.id.clone(),
            payload,
            last_skill: view.last_skill,
        }))
    }

    fn in_scope(&self, conv: &Conversation) -> bool {
        self.cfg.target_skills.is_none()
            || conv
                .events
                .iter()
                .any(|e| e.skill.is_some() && self.cfg.is_target_skill(e.skill.as_deref()))
    }
}
