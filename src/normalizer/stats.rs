use std::fmt;

/// Counters collected during one normalization pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub rows_in: usize,
    pub conversations_in: usize,
    /// Conversations dropped because no bot ever spoke in them
    pub conversations_without_bot: usize,
    /// Rows whose send time could not be read
    pub untimed_rows: usize,
    /// Tool-call groups that had more than one carrier row
    pub tool_groups_processed: usize,
    /// Rows that lost their tool fields to the group's chosen carrier
    pub tool_duplicates_cleared: usize,
    pub message_duplicates_removed: usize,
    pub agent_messages_removed: usize,
    pub rows_out: usize,
}

impl fmt::Display for NormalizeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows in {} conversations -> {} rows; dropped {} conversations without bot, \
             cleared {} tool duplicates across {} groups, removed {} duplicate messages \
             and {} agent messages ({} untimed rows)",
            self.rows_in,
            self.conversations_in,
            self.rows_out,
            self.conversations_without_bot,
            self.tool_duplicates_cleared,
            self.tool_groups_processed,
            self.message_duplicates_removed,
            self.agent_messages_removed,
            self.untimed_rows,
        )
    }
}
