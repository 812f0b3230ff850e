//! Diagnostics command.

use anyhow::Result;
use budget_core::db::{self, Database};
use budget_core::Migrator;
use colored::Colorize;
use std::path::Path;

use crate::config::Config;

pub fn execute(db_path: Option<&Path>, config: &Config) -> Result<()> {
    println!("{}", "budget-migrate Doctor".cyan().bold());
    println!("{}", "─".repeat(50));
    println!();

    let mut issues = Vec::new();

    // Check config file
    print!("  Config file: ");
    let config_path = Config::config_path();
    if config_path.exists() {
        println!("{}", "✓ exists".green());
    } else {
        println!("{}", "○ not found (using defaults)".yellow());
    }

    // Check SQLite
    print!("  SQLite {}: ", db::sqlite_version());
    if db::supports_rename_column() {
        println!("{}", "✓ supports RENAME COLUMN".green());
    } else {
        println!("{}", "✗ too old for RENAME COLUMN (needs 3.25.0)".red());
        issues.push("Linked SQLite cannot rename columns".to_string());
    }

    // Check database
    let path = config.database_path(db_path);
    print!("  Database ({}): ", path.display());
    if !path.exists() {
        println!("{}", "○ not found (a run will create it)".yellow());
    } else {
        match Database::open_read_only(&path) {
            Ok(db) => {
                println!("{}", "✓ readable".green());
                check_database(&db, &mut issues);
            }
            Err(e) => {
                println!("{}", format!("✗ {}", e).red());
                issues.push("Database not accessible".to_string());
            }
        }
    }

    // Check pending migrations
    print!("  Migrations: ");
    match Migrator::catalog()
        .with_busy_timeout(config.busy_timeout())
        .plan(&path)
    {
        Ok(plan) if plan.is_up_to_date() => println!("{}", "✓ up to date".green()),
        Ok(plan) => {
            println!(
                "{}",
                format!("○ {} pending change(s)", plan.pending_count()).yellow()
            );
            if plan.blocked_count() > 0 {
                issues.push(format!(
                    "{} migration step(s) cannot run against this schema",
                    plan.blocked_count()
                ));
            }
        }
        Err(e) => {
            println!("{}", format!("✗ {}", e).red());
            issues.push("Failed to inspect schema".to_string());
        }
    }

    // Summary
    println!();
    if issues.is_empty() {
        println!("{}", "✓ All checks passed".green().bold());
    } else {
        println!("{}", format!("✗ {} issue(s) found:", issues.len()).red().bold());
        for issue in &issues {
            println!("  • {}", issue);
        }
    }

    Ok(())
}

fn check_database(db: &Database, issues: &mut Vec<String>) {
    print!("  Integrity: ");
    match db.quick_check() {
        Ok(problems) if problems.is_empty() => println!("{}", "✓ ok".green()),
        Ok(problems) => {
            println!("{}", format!("✗ {} problem(s)", problems.len()).red());
            for problem in problems.iter().take(5) {
                println!("    {}", problem.dimmed());
            }
            issues.push("Database failed integrity check".to_string());
        }
        Err(e) => {
            println!("{}", format!("✗ {}", e).red());
            issues.push("Integrity check could not run".to_string());
        }
    }

    print!("  Tables: ");
    match db.snapshot() {
        Ok(snapshot) => println!("{}", snapshot.table_names().len()),
        Err(e) => println!("{}", format!("✗ {}", e).red()),
    }
}
