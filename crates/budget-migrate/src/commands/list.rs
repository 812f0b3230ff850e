//! List the migration catalog.

use anyhow::Result;
use budget_core::migrate::{catalog, MissingDatabase};
use colored::Colorize;

pub fn execute(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&catalog::ALL)?);
        return Ok(());
    }

    println!("{}", "Migrations".bold());
    println!("{}", "═".repeat(60));

    for migration in catalog::ALL {
        let on_missing = match migration.on_missing_database {
            MissingDatabase::Create => "creates missing database",
            MissingDatabase::Skip => "skips missing database",
        };
        println!(
            "{} {} {}",
            "●".cyan(),
            migration.name.bold(),
            format!("({} step(s), {})", migration.steps.len(), on_missing).dimmed()
        );
        println!("  {}", migration.description);
    }

    println!();
    Ok(())
}
