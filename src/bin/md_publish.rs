//! md-publish CLI Binary
//!
//! Command-line interface for publishing markdown trees to Notion.

use anyhow::Context;
use clap::Parser;
use md_publish::logging::init_logging;
use md_publish::tooling::cli::{Cli, CliContext};
use owo_colors::OwoColorize;
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            process::exit(1);
        }
    }
}

/// Returns whether every page published cleanly.
async fn run(cli: &Cli) -> anyhow::Result<bool> {
    let cwd = std::env::current_dir().context("Cannot determine working directory")?;
    let context =
        CliContext::new(&cwd, cli.config.clone()).context("Failed to load configuration")?;

    let logging = cli.logging_config(&context.config().logging);
    init_logging(Some(&logging)).context("Failed to initialize logging")?;

    let output = context.execute(&cli.command).await?;
    println!("{}", output.text);
    Ok(output.success)
}
