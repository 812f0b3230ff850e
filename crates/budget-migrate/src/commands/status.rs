//! Dry run: report what a migration run would change.

use anyhow::{Context, Result};
use budget_core::migrate::{MigrationPlan, StepState};
use colored::Colorize;

use crate::cli::MigrateArgs;
use crate::config::Config;

pub fn execute(args: &MigrateArgs, config: &Config) -> Result<()> {
    let path = config.database_path(args.db_path.as_deref());
    let migrator = super::migrator(&args.only, config)?;

    let plan = migrator
        .plan(&path)
        .with_context(|| format!("Failed to inspect {}", path.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan);
    }

    Ok(())
}

fn print_plan(plan: &MigrationPlan) {
    println!("{}", "Migration Status".bold());
    println!("{}", "═".repeat(60));
    println!("  {} {}", "Database:".cyan(), plan.database.display());

    if plan.database_missing {
        if plan.would_create {
            println!("  {}", "○ file does not exist, a run would create it".yellow());
        } else {
            println!("  {}", "○ file does not exist, a run would do nothing".yellow());
            return;
        }
    }
    if let Some(fingerprint) = &plan.fingerprint {
        println!("  {} {}", "Schema:".cyan(), fingerprint.dimmed());
    }

    for migration in &plan.migrations {
        println!();
        println!(
            "  {} {}",
            migration.name.bold(),
            format!("- {}", migration.description).dimmed()
        );
        for planned in &migration.steps {
            match planned.state {
                StepState::Pending => println!("    {} {}", "●".yellow(), planned.step),
                StepState::Satisfied(reason) => println!(
                    "    {} {} {}",
                    "✓".green(),
                    planned.step,
                    format!("({reason})").dimmed()
                ),
                StepState::Blocked(reason) => println!(
                    "    {} {} {}",
                    "✗".red(),
                    planned.step,
                    format!("({reason})").red()
                ),
            }
        }
    }

    println!();
    let blocked = plan.blocked_count();
    if blocked > 0 {
        println!(
            "{}",
            format!("✗ {blocked} step(s) cannot run against this schema").red().bold()
        );
    }
    if plan.is_up_to_date() {
        println!("{}", "✓ Schema is up to date".green().bold());
    } else if plan.pending_count() > 0 {
        println!(
            "{}",
            format!("● {} pending change(s)", plan.pending_count()).yellow().bold()
        );
    }
}
