//! budget-migrate - Budget Tracker schema migration CLI
//!
//! Run before the desktop application opens its database. Exits 0 when the
//! schema is current (or nothing needed migrating) and 1 on any failure.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;
mod config;

use cli::{Cli, Commands};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let env_directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directives = log_directives(env_directives.as_deref(), cli.verbose);

    // Logs go to stderr so --json output stays clean
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_new(directives)?)
        .init();

    // Load configuration
    let config = config::Config::load()?;

    // Execute command
    match cli.command {
        None => commands::run::execute(&cli.run, &config),
        Some(Commands::Run(args)) => commands::run::execute(&args, &config),
        Some(Commands::Status(args)) => commands::status::execute(&args, &config),
        Some(Commands::List { json }) => commands::list::execute(json),
        Some(Commands::Doctor { db_path }) => commands::doctor::execute(db_path.as_deref(), &config),
    }
}

/// Filter directives: `RUST_LOG` when set, otherwise the defaults. `--verbose`
/// always turns on debug output for both crates.
fn log_directives(env: Option<&str>, verbose: bool) -> String {
    let defaults = if verbose {
        "budget_migrate=debug,budget_core=debug"
    } else {
        "budget_migrate=info,budget_core=warn"
    };

    match env.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directives) if verbose => format!("{directives},{defaults}"),
        Some(directives) => directives.to_string(),
        None => defaults.to_string(),
    }
}
