//! Command implementations for budget-migrate.
//!
//! Each submodule implements the logic for one command.

pub mod doctor;
pub mod list;
pub mod run;
pub mod status;

use anyhow::Result;
use budget_core::Migrator;

use crate::config::Config;

/// Build the migrator for a command: the full catalog, or the `--only` subset.
pub(crate) fn migrator(only: &[String], config: &Config) -> Result<Migrator<'static>> {
    let migrator = if only.is_empty() {
        Migrator::catalog()
    } else {
        Migrator::select(only)?
    };
    Ok(migrator.with_busy_timeout(config.busy_timeout()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrator_defaults_to_catalog() {
        let migrator = migrator(&[], &Config::default()).unwrap();
        assert_eq!(
            migrator.migrations().len(),
            budget_core::migrate::catalog::ALL.len()
        );
    }

    #[test]
    fn test_migrator_rejects_unknown_name() {
        let err = migrator(&["nope".to_string()], &Config::default()).unwrap_err();
        assert!(err.to_string().contains("Unknown migration: nope"));
    }
}
