use std::collections::BTreeMap;
use std::fmt;

use crate::provider::Usage;

use super::usage::UsageSnapshot;

/// Marker written in place of output when the judge answered with nothing.
pub const EMPTY_MARKER: &str = "(empty)";

/// One serialized conversation to be judged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationRequest {
    pub conversation_id: String,
    /// Rendered conversation sent as the user turn
    pub payload: String,
    /// Key for the prompt lookup when it differs from the conversation id
    pub lookup_key: Option<String>,
}

impl EvaluationRequest {
    pub fn new(conversation_id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            payload: payload.into(),
            lookup_key: None,
        }
    }

    pub fn with_lookup_key(mut self, key: impl Into<String>) -> Self {
        self.lookup_key = Some(key.into());
        self
    }

    pub fn lookup_key(&self) -> &str {
        self.lookup_key.as_deref().unwrap_or(&self.conversation_id)
    }
}

/// A prompt template and the requests it is applied to.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    /// System prompt; may carry the lookup placeholder
    pub prompt: String,
    pub requests: Vec<EvaluationRequest>,
}

impl Batch {
    pub fn new(prompt: impl Into<String>, requests: Vec<EvaluationRequest>) -> Self {
        Self {
            prompt: prompt.into(),
            requests,
        }
    }
}

/// Final state of a request that reached the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(String),
    /// The provider answered with blank content
    Empty,
    /// Attempts exhausted or a non-retryable error; holds the last cause
    Failed(String),
}

impl Outcome {
    pub fn status(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::Empty => "empty",
            Outcome::Failed(_) => "failed",
        }
    }

    /// Text stored as the judge output: the answer, the empty marker, or nothing.
    pub fn output(&self) -> &str {
        match self {
            Outcome::Success(text) => text,
            Outcome::Empty => EMPTY_MARKER,
            Outcome::Failed(_) => "",
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Failed(cause) => Some(cause),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationResult {
    /// Position of the request in its batch
    pub request_index: usize,
    pub conversation_id: String,
    pub outcome: Outcome,
    /// Attempts made, including the first
    pub attempts: usize,
    /// Usage reported by the attempt that produced the outcome
    pub usage: Option<Usage>,
}

/// Why a request never reached the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    /// The lookup answered but carried no instructions
    NoSystemPrompt,
    /// The lookup itself failed
    LookupFailed,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NoSystemPrompt => "no_system_prompt",
            SkipReason::LookupFailed => "lookup_failed",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub request_index: usize,
    pub conversation_id: String,
    pub reason: SkipReason,
    pub detail: String,
}

/// Counts for one dispatch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub empty: usize,
    pub failed: usize,
    pub skipped: usize,
    pub skip_reasons: BTreeMap<SkipReason, usize>,
}

impl RunSummary {
    pub fn tally(results: &[EvaluationResult], skipped: &[Skipped]) -> Self {
        let mut summary = RunSummary {
            attempted: results.len() + skipped.len(),
            skipped: skipped.len(),
            ..Default::default()
        };
        for result in results {
            match result.outcome {
                Outcome::Success(_) => summary.succeeded += 1,
                Outcome::Empty => summary.empty += 1,
                Outcome::Failed(_) => summary.failed += 1,
            }
        }
        for skip in skipped {
            *summary.skip_reasons.entry(skip.reason).or_default() += 1;
        }
        summary
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} attempted, {} succeeded, {} empty, {} failed, {} skipped",
            self.attempted, self.succeeded, self.empty, self.failed, self.skipped
        )?;
        if !self.skip_reasons.is_empty() {
            let reasons: Vec<String> = self
                .skip_reasons
                .iter()
                .map(|(reason, count)| format!("{reason}={count}"))
                .collect();
            write!(f, " ({})", reasons.join(", "))?;
        }
        Ok(())
    }
}

/// Everything a dispatch run produced.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    /// One entry per request that reached the provider, in batch order
    pub results: Vec<EvaluationResult>,
    pub skipped: Vec<Skipped>,
    pub summary: RunSummary,
    /// Cumulative usage of the dispatcher after this run
    pub usage: UsageSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(index: usize, outcome: Outcome) -> EvaluationResult {
        EvaluationResult {
            request_index: index,
            conversation_id: format!("c{index}"),
            outcome,
            attempts: 1,
            usage: None,
        }
    }

    #[test]
    fn tallies_outcomes_and_skip_reasons() {
        let results = vec![
            result(0, Outcome::Success("ok".into())),
            result(1, Outcome::Empty),
            result(3, Outcome::Failed("boom".into())),
        ];
        let skipped = vec![Skipped {
            request_index: 2,
            conversation_id: "c2".into(),
            reason: SkipReason::NoSystemPrompt,
            detail: "404".into(),
        }];

        let summary = RunSummary::tally(&results, &skipped);
        assert_eq!(summary.attempted, 4);
        assert_eq!(
            summary.to_string(),
            "4 attempted, 1 succeeded, 1 empty, 1 failed, 1 skipped (no_system_prompt=1)"
        );
    }

    #[test]
    fn empty_outcome_uses_marker() {
        assert_eq!(Outcome::Empty.output(), "(empty)");
        assert_eq!(Outcome::Failed("x".into()).output(), "");
        assert_eq!(Outcome::Failed("x".into()).error(), Some("x"));
    }
}
