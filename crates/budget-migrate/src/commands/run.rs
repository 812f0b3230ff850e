//! Default command: apply pending migrations.

use anyhow::{Context, Result};
use budget_core::migrate::{MigrationReport, StepStatus};
use colored::Colorize;
use tracing::info;

use crate::cli::MigrateArgs;
use crate::config::Config;

pub fn execute(args: &MigrateArgs, config: &Config) -> Result<()> {
    let path = config.database_path(args.db_path.as_deref());
    let migrator = super::migrator(&args.only, config)?;

    info!(database = %path.display(), "Starting migration");
    let report = migrator
        .run(&path)
        .with_context(|| format!("Migration failed for {}", path.display()))?;
    info!(applied = report.applied_count(), "Migration finished");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &MigrationReport) {
    if report.database_missing {
        println!(
            "{} Database {} does not exist, nothing to migrate",
            "○".yellow(),
            report.database.display().to_string().cyan()
        );
        return;
    }

    println!(
        "{} {}",
        "Migrating".bold(),
        report.database.display().to_string().cyan()
    );
    if report.created {
        println!("  {} created new database file", "✓".green());
    }

    for migration in &report.migrations {
        println!();
        println!("  {}", migration.name.bold());
        for outcome in &migration.steps {
            match outcome.status {
                StepStatus::Applied => println!("    {} {}", "✓".green(), outcome.step),
                StepStatus::Skipped(reason) => println!(
                    "    {} {} {}",
                    "○".dimmed(),
                    outcome.step,
                    format!("({reason})").dimmed()
                ),
            }
        }
    }

    println!();
    if report.is_up_to_date() {
        println!("{}", "✓ Schema already up to date".green().bold());
    } else {
        println!(
            "{}",
            format!("✓ Migration complete: {} change(s) applied", report.applied_count())
                .green()
                .bold()
        );
    }
    if let Some(fingerprint) = &report.fingerprint {
        println!("  {} {}", "Schema:".dimmed(), fingerprint.dimmed());
    }
}
