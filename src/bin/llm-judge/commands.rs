use std::fs;
use std::path::Path;

use anyhow::Context;
use llm_judge::checkpoint::CheckpointKey;
use llm_judge::config::JudgeConfig;
use llm_judge::logging::init_logging;
use llm_judge::normalizer::{validate_cleaning, Normalizer};
use llm_judge::source::{read_events_from_path, write_events_to_path};
use llm_judge::{Pipeline, RunOutcome};

use crate::args::{CliArgs, Command};

fn load_config(path: Option<&Path>) -> anyhow::Result<JudgeConfig> {
    match path {
        Some(path) => JudgeConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(JudgeConfig::default()),
    }
}

pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    let _logger = init_logging(&config.logging)?;

    match args.command {
        Command::Normalize {
            export,
            output,
            strip_agents,
        } => {
            config.normalizer.strip_agent_messages |= strip_agents;
            let events = read_events_from_path(&export)
                .with_context(|| format!("failed to read {}", export.display()))?;
            let normalized = Normalizer::new(config.normalizer.clone()).normalize(events);
            for issue in validate_cleaning(&normalized.events) {
                eprintln!("warning: {issue}");
            }
            write_events_to_path(&output, &normalized.events)?;
            println!("{}", normalized.stats);
            println!("Cleaned export written to {}", output.display());
        }
        Command::Run {
            export,
            prompt,
            collection,
            kind,
            date,
            model,
            concurrency,
        } => {
            if let Some(model) = model {
                config.provider.model = model;
            }
            let prompt = fs::read_to_string(&prompt)
                .with_context(|| format!("failed to read prompt {}", prompt.display()))?;
            let key = match date {
                Some(date) => CheckpointKey::new(collection, kind, date),
                None => CheckpointKey::for_yesterday(collection, kind),
            };

            let mut pipeline = Pipeline::from_config(&config)?;
            if let Some(limit) = concurrency {
                pipeline = pipeline.concurrency_limit(limit);
            }

            match pipeline.run_csv(&key, &prompt, &export).await? {
                RunOutcome::Cached { path } => {
                    println!("Results for {key} already exist: {}", path.display());
                }
                RunOutcome::Completed {
                    path,
                    normalize,
                    report,
                    ..
                } => {
                    println!("{normalize}");
                    println!("{}", report.summary);
                    println!("{}", report.usage);
                    println!("Results written to {}", path.display());
                }
            }
        }
    }
    Ok(())
}
