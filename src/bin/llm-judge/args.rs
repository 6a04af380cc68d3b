use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "llm-judge",
    about = "Clean conversation exports and judge them with an LLM"
)]
pub struct CliArgs {
    /// TOML or YAML configuration file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Normalize an export and write the cleaned rows
    Normalize {
        #[arg(long, short = 'i')]
        export: PathBuf,
        #[arg(long, short = 'o')]
        output: PathBuf,
        /// Drop rows sent by human agents
        #[arg(long)]
        strip_agents: bool,
    },
    /// Judge an export unless results for the key already exist
    Run {
        #[arg(long, short = 'i')]
        export: PathBuf,
        /// File holding the judge's system prompt
        #[arg(long, short = 'p')]
        prompt: PathBuf,
        #[arg(long)]
        collection: String,
        #[arg(long)]
        kind: String,
        /// Run date (YYYY-MM-DD); defaults to yesterday
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, short = 'm')]
        model: Option<String>,
        #[arg(long)]
        concurrency: Option<usize>,
    },
}
