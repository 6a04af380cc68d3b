//! End-to-end run for one checkpoint key.
//!
//! cache lookup → normalize → assemble → dispatch → write artifact

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{
    assembler::Assembler,
    checkpoint::{ArtifactRow, CheckpointCache, CheckpointKey},
    config::JudgeConfig,
    dispatcher::{Batch, DispatchReport, Dispatcher, EvaluationRequest},
    error::JudgeError,
    event::Event,
    normalizer::{NormalizeStats, Normalizer},
    provider::JudgeProvider,
    source::read_events_from_path,
};

/// What a pipeline run did.
#[derive(Debug)]
pub enum RunOutcome {
    /// Results for the key already existed; nothing was dispatched.
    Cached { path: PathBuf },
    Completed {
        path: PathBuf,
        normalize: NormalizeStats,
        /// Conversations that passed assembly and were submitted
        conversations: usize,
        report: DispatchReport,
    },
}

impl RunOutcome {
    pub fn path(&self) -> &Path {
        match self {
            RunOutcome::Cached { path } | RunOutcome::Completed { path, .. } => path,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, RunOutcome::Cached { .. })
    }
}

pub struct Pipeline {
    normalizer: Normalizer,
    assembler: Assembler,
    dispatcher: Dispatcher,
    cache: CheckpointCache,
    concurrency_limit: usize,
}

impl Pipeline {
    pub fn new(
        normalizer: Normalizer,
        assembler: Assembler,
        dispatcher: Dispatcher,
        cache: CheckpointCache,
    ) -> Self {
        let concurrency_limit = dispatcher.config().concurrency_limit;
        Self {
            normalizer,
            assembler,
            dispatcher,
            cache,
            concurrency_limit,
        }
    }

    /// Builds every stage from configuration. Missing credentials fail here.
    pub fn from_config(cfg: &JudgeConfig) -> Result<Self, JudgeError> {
        let provider = cfg.provider.build()?;
        Self::with_provider(cfg, provider)
    }

    /// Like [`Pipeline::from_config`] with an already constructed provider.
    pub fn with_provider(
        cfg: &JudgeConfig,
        provider: Arc<dyn JudgeProvider>,
    ) -> Result<Self, JudgeError> {
        let mut dispatcher = Dispatcher::new(provider, cfg.dispatch.clone());
        if let Some(lookup) = cfg.lookup.build()? {
            dispatcher = dispatcher.with_lookup(lookup);
        }
        Ok(Self::new(
            Normalizer::new(cfg.normalizer.clone()),
            Assembler::new(cfg.assembler.clone()),
            dispatcher,
            cfg.checkpoint.cache(),
        ))
    }

    pub fn concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    pub fn cache(&self) -> &CheckpointCache {
        &self.cache
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub async fn run(
        &self,
        key: &CheckpointKey,
        prompt: &str,
        events: Vec<Event>,
    ) -> Result<RunOutcome, JudgeError> {
        if let Some(path) = self.cache.lookup(key) {
            return Ok(RunOutcome::Cached { path });
        }

        let normalized = self.normalizer.normalize(events);
        let conversations = self.assembler.assemble(normalized.events)?;
        log::info!("{key}: {} conversations ready for judging", conversations.len());

        let requests = conversations
            .into_iter()
            .map(|conv| EvaluationRequest::new(conv.conversation_id, conv.payload))
            .collect();
        let batch = Batch::new(prompt, requests);
        let report = self.dispatcher.evaluate(&batch, self.concurrency_limit).await?;

        let pretty = self.cache.is_pretty_json();
        let rows: Vec<ArtifactRow> = report
            .results
            .iter()
            .map(|result| {
                let payload = batch
                    .requests
                    .get(result.request_index)
                    .map(|req| req.payload.as_str())
                    .unwrap_or_default();
                ArtifactRow::from_result(result, payload, pretty)
            })
            .collect();
        let path = self.cache.write(key, &rows)?;

        Ok(RunOutcome::Completed {
            path,
            normalize: normalized.stats,
            conversations: batch.requests.len(),
            report,
        })
    }

    /// Runs from an export file. The file is not read when the key is cached.
    pub async fn run_csv(
        &self,
        key: &CheckpointKey,
        prompt: &str,
        export: impl AsRef<Path>,
    ) -> Result<RunOutcome, JudgeError> {
        if let Some(path) = self.cache.lookup(key) {
            return Ok(RunOutcome::Cached { path });
        }
        let events = read_events_from_path(export)?;
        self.run(key, prompt, events).await
    }
}
