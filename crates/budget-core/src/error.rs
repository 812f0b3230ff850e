//! Error types for budget-core.

use thiserror::Error;

/// Result type alias using budget-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for schema operations
#[derive(Error, Debug)]
pub enum Error {
    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration {migration} failed at step `{step}`: {source}")]
    Step {
        migration: &'static str,
        step: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Cannot add column {table}.{column}: table {table} does not exist")]
    MissingTable { table: String, column: String },

    // Catalog errors
    #[error("Unknown migration: {0}")]
    UnknownMigration(String),
}

impl Error {
    /// Attach the failing step to a store error
    pub fn step(migration: &'static str, step: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Step {
            migration,
            step: step.into(),
            source,
        }
    }

    /// Whether the underlying store reported lock contention
    pub fn is_busy(&self) -> bool {
        let source = match self {
            Self::Database(e) | Self::Step { source: e, .. } => e,
            _ => return false,
        };
        matches!(
            source.sqlite_error_code(),
            Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_table_message() {
        let e = Error::MissingTable {
            table: "budget_estimates".to_string(),
            column: "is_default".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Cannot add column budget_estimates.is_default: table budget_estimates does not exist"
        );
    }

    #[test]
    fn test_step_error_includes_context() {
        let source = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            Some("database is locked".to_string()),
        );
        let e = Error::step("feature_enhancements", "create table bank_transactions", source);

        let message = e.to_string();
        assert!(message.starts_with("Migration feature_enhancements failed"));
        assert!(message.contains("create table bank_transactions"));
        assert!(e.is_busy());
    }

    #[test]
    fn test_unknown_migration_is_not_busy() {
        let e = Error::UnknownMigration("nope".to_string());
        assert_eq!(e.to_string(), "Unknown migration: nope");
        assert!(!e.is_busy());
    }
}
