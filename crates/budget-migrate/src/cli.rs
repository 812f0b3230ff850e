//! CLI argument definitions using clap derive macros.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Budget Tracker schema migration
///
/// Brings a budget database up to the current schema. Safe to run repeatedly.
#[derive(Parser, Debug)]
#[command(name = "budget-migrate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log every migration step
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Arguments for the default `run` command
    #[command(flatten)]
    pub run: MigrateArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending migrations (default when no command is given)
    Run(MigrateArgs),

    /// Show what a run would change, without touching the database
    Status(MigrateArgs),

    /// List the migration catalog
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run diagnostics against the configured database
    Doctor {
        /// Path to the budget database
        db_path: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct MigrateArgs {
    /// Path to the budget database (defaults to the configured path)
    pub db_path: Option<PathBuf>,

    /// Only consider these migrations (repeatable)
    #[arg(long = "only", value_name = "NAME")]
    pub only: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bare_path_runs_migration() {
        let cli = Cli::try_parse_from(["budget-migrate", "household.db"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.db_path, Some(PathBuf::from("household.db")));
    }

    #[test]
    fn test_no_arguments_uses_defaults() {
        let cli = Cli::try_parse_from(["budget-migrate"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.run.db_path.is_none());
        assert!(cli.run.only.is_empty());
    }

    #[test]
    fn test_status_with_only() {
        let cli = Cli::try_parse_from([
            "budget-migrate",
            "status",
            "household.db",
            "--only",
            "generic_user_columns",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Status(args)) => {
                assert_eq!(args.db_path, Some(PathBuf::from("household.db")));
                assert_eq!(args.only, vec!["generic_user_columns".to_string()]);
                assert!(args.json);
            }
            other => panic!("expected status command, got {other:?}"),
        }
    }

    #[test]
    fn test_doctor_without_path() {
        let cli = Cli::try_parse_from(["budget-migrate", "doctor"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Doctor { db_path: None })));
    }

    #[test]
    fn test_verbose_after_subcommand() {
        let cli = Cli::try_parse_from(["budget-migrate", "run", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Run(_))));
    }
}
