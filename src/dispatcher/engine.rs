use std::borrow::Cow;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::time::{sleep, timeout};

use crate::{
    error::JudgeError,
    lookup::{fill_template, needs_lookup, PromptLookup},
    provider::JudgeProvider,
};

use super::config::DispatchConfig;
use super::retry::{backoff_delay, budget, classify, ErrorClass};
use super::types::{
    Batch, DispatchReport, EvaluationRequest, EvaluationResult, Outcome, RunSummary, SkipReason,
    Skipped,
};
use super::usage::{UsageMeter, UsageSnapshot};

/// Drives batches of conversations through a judge provider.
pub struct Dispatcher {
    provider: Arc<dyn JudgeProvider>,
    lookup: Option<Arc<dyn PromptLookup>>,
    cfg: DispatchConfig,
    usage: Arc<UsageMeter>,
}

enum Settled {
    Done(EvaluationResult),
    Skipped(Skipped),
}

/// Trailing characters of a conversation id, enough to find it in logs.
fn id_tail(id: &str) -> &str {
    let start = id
        .char_indices()
        .rev()
        .nth(5)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    &id[start..]
}

impl Dispatcher {
    pub fn new(provider: Arc<dyn JudgeProvider>, cfg: DispatchConfig) -> Self {
        Self {
            provider,
            lookup: None,
            cfg,
            usage: Arc::new(UsageMeter::new()),
        }
    }

    /// Attaches the source used to fill prompts that carry the lookup placeholder.
    pub fn with_lookup(mut self, lookup: Arc<dyn PromptLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.cfg
    }

    pub fn provider(&self) -> &dyn JudgeProvider {
        self.provider.as_ref()
    }

    /// Usage accumulated over every batch this dispatcher has run.
    pub fn usage(&self) -> UsageSnapshot {
        self.usage.snapshot()
    }

    /// Evaluates every request of `batch` with at most `concurrency_limit`
    /// requests in flight.
    ///
    /// Results come back in batch order. Individual failures never abort the
    /// batch; the only error is a prompt that needs a lookup when none is
    /// attached.
    pub async fn evaluate(
        &self,
        batch: &Batch,
        concurrency_limit: usize,
    ) -> Result<DispatchReport, JudgeError> {
        if needs_lookup(&batch.prompt) && self.lookup.is_none() {
            return Err(JudgeError::ConfigError(
                "prompt needs a per-conversation lookup but none is configured".to_string(),
            ));
        }

        log::debug!(
            "Dispatching {} conversations to {} with concurrency {}",
            batch.requests.len(),
            self.provider.name(),
            concurrency_limit
        );

        let gate = Semaphore::new(concurrency_limit.max(1));
        let gate = &gate;
        let futures = batch
            .requests
            .iter()
            .enumerate()
            .map(|(index, request)| async move {
                let _permit = gate.acquire().await.ok();
                self.process(index, &batch.prompt, request).await
            });

        let mut results = Vec::with_capacity(batch.requests.len());
        let mut skipped = Vec::new();
        for settled in join_all(futures).await {
            match settled {
                Settled::Done(result) => results.push(result),
                Settled::Skipped(skip) => skipped.push(skip),
            }
        }

        let summary = RunSummary::tally(&results, &skipped);
        let usage = self.usage.snapshot();
        log::info!("Batch finished: {summary}");
        log::info!("Token usage: {usage}");

        Ok(DispatchReport {
            results,
            skipped,
            summary,
            usage,
        })
    }

    async fn process(&self, index: usize, template: &str, request: &EvaluationRequest) -> Settled {
        match self.resolve_prompt(template, request.lookup_key()).await {
            Ok(system) => Settled::Done(self.submit_with_retry(index, &system, request).await),
            Err((reason, detail)) => {
                log::warn!(
                    "Skipping conversation …{}: {reason} ({detail})",
                    id_tail(&request.conversation_id)
                );
                Settled::Skipped(Skipped {
                    request_index: index,
                    conversation_id: request.conversation_id.clone(),
                    reason,
                    detail,
                })
            }
        }
    }

    async fn resolve_prompt<'a>(
        &self,
        template: &'a str,
        key: &str,
    ) -> Result<Cow<'a, str>, (SkipReason, String)> {
        if !needs_lookup(template) {
            return Ok(Cow::Borrowed(template));
        }
        let Some(lookup) = &self.lookup else {
            return Err((SkipReason::NoSystemPrompt, "no lookup configured".to_string()));
        };

        let fetched = match timeout(self.cfg.attempt_timeout(), lookup.fetch(key)).await {
            Ok(fetched) => fetched,
            Err(_) => Err(JudgeError::Timeout(format!(
                "prompt lookup exceeded {}s",
                self.cfg.attempt_timeout_seconds
            ))),
        };
        match fetched {
            Ok(instructions) => Ok(Cow::Owned(fill_template(template, &instructions))),
            Err(err) => {
                let reason = match classify(&err) {
                    ErrorClass::Skip => SkipReason::NoSystemPrompt,
                    _ => SkipReason::LookupFailed,
                };
                Err((reason, err.to_string()))
            }
        }
    }

    async fn submit_with_retry(
        &self,
        index: usize,
        system: &str,
        request: &EvaluationRequest,
    ) -> EvaluationResult {
        let base = self.provider.base_budget();
        let max_attempts = self.cfg.attempt_limit();
        let tail = id_tail(&request.conversation_id);
        let mut attempt = 0usize;

        loop {
            let max_tokens = budget(base, attempt);
            let call = self.provider.submit(system, &request.payload, max_tokens);
            let result = match timeout(self.cfg.attempt_timeout(), call).await {
                Ok(result) => result,
                Err(_) => Err(JudgeError::Timeout(format!(
                    "attempt exceeded {}s",
                    self.cfg.attempt_timeout_seconds
                ))),
            };
            let attempts = attempt + 1;

            let err = match result {
                Ok(reply) => {
                    self.usage.record(reply.usage);
                    let outcome = match reply.content {
                        Some(text) => Outcome::Success(text),
                        None => {
                            log::debug!("Conversation …{tail} produced an empty judgement");
                            Outcome::Empty
                        }
                    };
                    return EvaluationResult {
                        request_index: index,
                        conversation_id: request.conversation_id.clone(),
                        outcome,
                        attempts,
                        usage: reply.usage,
                    };
                }
                Err(err) => err,
            };

            let class = classify(&err);
            let retryable = matches!(class, ErrorClass::Retryable | ErrorClass::RateLimited);
            if !retryable || attempts >= max_attempts {
                log::warn!("Conversation …{tail} failed after {attempts} attempt(s): {err}");
                return EvaluationResult {
                    request_index: index,
                    conversation_id: request.conversation_id.clone(),
                    outcome: Outcome::Failed(err.to_string()),
                    attempts,
                    usage: None,
                };
            }

            let delay = backoff_delay(&self.cfg, attempt, class);
            log::warn!(
                "Conversation …{tail} attempt {attempts}/{max_attempts} failed: {err}; retrying with budget {} in {:?}",
                budget(base, attempts),
                delay
            );
            sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::id_tail;

    #[test]
    fn keeps_last_six_characters() {
        assert_eq!(id_tail("conversation-123456"), "123456");
        assert_eq!(id_tail("abc"), "abc");
        assert_eq!(id_tail("ééééééé"), "éééééé");
    }
}
