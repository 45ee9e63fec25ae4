mod autoupdate;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod utils;
mod workflow;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;
use workflow::ApplyOptions;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Fetch { id, raw } => workflow::execute_fetch(&cli.path, config_path, &id, raw),
        Commands::Apply {
            id,
            dry_run,
            raw,
            test_command,
        } => workflow::execute_apply(
            &cli.path,
            config_path,
            &id,
            ApplyOptions {
                dry_run,
                raw,
                test_command,
            },
        ),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}
