use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;

use crate::event::{group_by_conversation, sort_chronologically, Event, SenderRole, ToolKey};

use super::config::NormalizerConfig;
use super::stats::NormalizeStats;

/// Output of a normalization pass.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub events: Vec<Event>,
    pub stats: NormalizeStats,
}

/// Collapses raw export rows into one clean timeline per conversation.
///
/// Exports repeat a tool call on every message row emitted while the call was
/// in flight, and sometimes repeat whole rows. The normalizer keeps the tool
/// fields on a single carrier row per call and drops exact repeats. It never
/// removes text that has no identical copy.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    cfg: NormalizerConfig,
}

#[derive(PartialEq, Eq, Hash)]
struct MessageKey {
    text: Option<String>,
    sent_at: Option<NaiveDateTime>,
    sender: String,
    tool: Option<ToolKey>,
}

impl Normalizer {
    pub fn new(cfg: NormalizerConfig) -> Self {
        Self { cfg }
    }

    pub fn normalize(&self, events: Vec<Event>) -> Normalized {
        let mut stats = NormalizeStats {
            rows_in: events.len(),
            untimed_rows: events.iter().filter(|e| e.sent_at.is_none()).count(),
            ..NormalizeStats::default()
        };

        let partitions = group_by_conversation(events);
        stats.conversations_in = partitions.len();

        let mut out = Vec::with_capacity(stats.rows_in);
        for mut rows in partitions {
            if !rows.iter().any(|e| e.role() == SenderRole::Bot) {
                stats.conversations_without_bot += 1;
                continue;
            }
            sort_chronologically(&mut rows);
            attribute_tools(&mut rows, &mut stats);
            stats.message_duplicates_removed += remove_exact_duplicates(&mut rows);
            if self.cfg.strip_agent_messages {
                let before = rows.len();
                rows.retain(|e| e.role() != SenderRole::Agent);
                stats.agent_messages_removed += before - rows.len();
            }
            out.extend(rows);
        }
        stats.rows_out = out.len();

        log::debug!("Normalized export: {stats}");
        Normalized { events: out, stats }
    }
}

/// Groups rows of one conversation by tool-call identity, in first-seen order.
/// Rows whose tool has no creation time keep their tool fields untouched.
fn tool_groups(rows: &[Event]) -> Vec<(ToolKey, Vec<usize>)> {
    let mut index: HashMap<ToolKey, usize> = HashMap::new();
    let mut groups: Vec<(ToolKey, Vec<usize>)> = Vec::new();
    for (i, event) in rows.iter().enumerate() {
        let Some(key) = event.attributable_tool_key() else {
            continue;
        };
        match index.get(&key) {
            Some(&g) => groups[g].1.push(i),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![i]));
            }
        }
    }
    groups
}

/// Distance between a row's send time and the tool's creation time.
/// Rows missing either timestamp rank after every timed row.
fn attribution_rank(event: &Event, created_at: Option<NaiveDateTime>) -> (bool, i64) {
    match (event.sent_at, created_at) {
        (Some(sent), Some(created)) => (false, (sent - created).num_milliseconds().abs()),
        _ => (true, 0),
    }
}

fn attribute_tools(rows: &mut [Event], stats: &mut NormalizeStats) {
    for (key, members) in tool_groups(rows) {
        if members.len() < 2 {
            continue;
        }
        stats.tool_groups_processed += 1;

        let bot_members: Vec<usize> = members
            .iter()
            .copied()
            .filter(|&i| rows[i].sent_by(SenderRole::Bot))
            .collect();
        let candidates = if bot_members.is_empty() {
            &members
        } else {
            &bot_members
        };
        let Some(&keep) = candidates
            .iter()
            .min_by_key(|&&i| attribution_rank(&rows[i], key.created_at))
        else {
            continue;
        };

        for &i in members.iter().filter(|&&i| i != keep) {
            rows[i].tool = None;
            stats.tool_duplicates_cleared += 1;
        }
    }
}

fn remove_exact_duplicates(rows: &mut Vec<Event>) -> usize {
    let mut seen: HashSet<MessageKey> = HashSet::with_capacity(rows.len());
    let before = rows.len();
    rows.retain(|e| {
        seen.insert(MessageKey {
            text: e.text.clone(),
            sent_at: e.sent_at,
            sender: e.sender.clone(),
            tool: e.tool_key(),
        })
    });
    before - rows.len()
}

/// Returns the ids of conversations in which two rows still carry the same
/// tool call. Empty for any output of [`Normalizer::normalize`].
pub fn validate_cleaning(events: &[Event]) -> Vec<String> {
    let mut seen: HashSet<(&str, ToolKey)> = HashSet::new();
    let mut offenders: Vec<String> = Vec::new();
    for event in events {
        let Some(key) = event.attributable_tool_key() else {
            continue;
        };
        let id = event.conversation_id.as_str();
        if !seen.insert((id, key)) && !offenders.iter().any(|o| o == id) {
            log::warn!("Conversation {id} still carries a duplicated tool call");
            offenders.push(id.to_string());
        }
    }
    offenders
}
