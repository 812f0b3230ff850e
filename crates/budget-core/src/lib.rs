//! budget-core - Core library for Budget Tracker
//!
//! Keeps the single-file SQLite database of the desktop application on the
//! current schema:
//!
//! - **db**: schema introspection (tables, columns, snapshots, fingerprints)
//! - **migrate**: idempotent migration steps, the fixed catalog and the migrator

pub mod db;
pub mod error;
pub mod migrate;

// Re-export commonly used types
pub use db::Database;
pub use error::{Error, Result};
pub use migrate::{
    run_migration, Migration, MigrationPlan, MigrationReport, MigrationStep, Migrator,
    MissingDatabase,
};

/// File name the desktop application uses when no path is configured.
pub const DEFAULT_DATABASE_FILE: &str = "budget_tracker.db";
