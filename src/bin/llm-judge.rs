#[path = "llm-judge/args.rs"]
mod args;
#[path = "llm-judge/commands.rs"]
mod commands;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = args::CliArgs::parse();
    commands::run(args).await
}
