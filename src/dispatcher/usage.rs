use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::provider::Usage;

/// Token counters shared by every in-flight request of a run.
///
/// Counters only grow; each completed attempt records once.
#[derive(Debug, Default)]
pub struct UsageMeter {
    input: AtomicU64,
    output: AtomicU64,
    total: AtomicU64,
    conversations: AtomicU64,
}

impl UsageMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one successful response. A missing usage block still counts
    /// the conversation.
    pub fn record(&self, usage: Option<Usage>) {
        if let Some(usage) = usage {
            self.input
                .fetch_add(u64::from(usage.prompt_tokens), Ordering::Relaxed);
            self.output
                .fetch_add(u64::from(usage.completion_tokens), Ordering::Relaxed);
            self.total
                .fetch_add(u64::from(usage.total_tokens), Ordering::Relaxed);
        }
        self.conversations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            input_tokens: self.input.load(Ordering::Relaxed),
            output_tokens: self.output.load(Ordering::Relaxed),
            total_tokens: self.total.load(Ordering::Relaxed),
            conversations: self.conversations.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of a [`UsageMeter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageSnapshot {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub conversations: u64,
}

impl fmt::Display for UsageSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conversations == 0 {
            return write!(f, "no conversations processed");
        }
        write!(
            f,
            "{} total tokens ({}→{}) for {} conversations",
            self.total_tokens, self.input_tokens, self.output_tokens, self.conversations
        )
    }
}
