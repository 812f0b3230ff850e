//! Idempotent schema migrations.
//!
//! A run applies an ordered list of [`Migration`]s to one database file inside
//! a single immediate transaction. SQLite DDL is transactional, so a failure
//! at any step rolls back every earlier `CREATE TABLE` / `ALTER TABLE` of the
//! same run. Re-running a completed run is a no-op: each step inspects the
//! live schema before acting.

pub mod catalog;
pub mod report;
pub mod step;

pub use report::*;
pub use step::*;

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::db::{schema_snapshot, Database, DEFAULT_BUSY_TIMEOUT};
use crate::error::{Error, Result};

/// What a run does when the database file does not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDatabase {
    /// Create the file and build the schema from scratch
    Create,
    /// Nothing to migrate; succeed without creating a file
    Skip,
}

/// A named, ordered group of steps.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Migration {
    pub name: &'static str,
    pub description: &'static str,
    pub on_missing_database: MissingDatabase,
    pub steps: &'static [MigrationStep],
}

/// Applies a selection of migrations to a database file.
#[derive(Debug)]
pub struct Migrator<'a> {
    migrations: Vec<&'a Migration>,
    busy_timeout: Duration,
}

impl<'a> Migrator<'a> {
    pub fn new(migrations: impl IntoIterator<Item = &'a Migration>) -> Self {
        Self {
            migrations: migrations.into_iter().collect(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// How long to wait on a locked database before failing the run
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn migrations(&self) -> &[&'a Migration] {
        &self.migrations
    }

    fn creates_missing_database(&self) -> bool {
        self.migrations
            .iter()
            .any(|m| m.on_missing_database == MissingDatabase::Create)
    }

    /// Apply every selected migration in one transaction.
    ///
    /// On error nothing is committed, and a file created by this call is removed.
    pub fn run(&self, path: &Path) -> Result<MigrationReport> {
        let existed = path.exists();
        if !existed && !self.creates_missing_database() {
            info!(path = %path.display(), "database does not exist yet - no migration needed");
            return Ok(MigrationReport::missing(path.to_path_buf()));
        }

        info!(
            path = %path.display(),
            migrations = self.migrations.len(),
            "starting schema migration"
        );

        let mut db = Database::open_path(path, self.busy_timeout)?;
        let result = self.apply_in_transaction(db.connection_mut());

        let (migrations, fingerprint) = match result {
            Ok(applied) => applied,
            Err(e) => {
                drop(db);
                if !existed {
                    if let Err(remove_err) = std::fs::remove_file(path) {
                        warn!(error = %remove_err, "failed to remove partially created database");
                    }
                }
                return Err(e);
            }
        };

        let report = MigrationReport {
            database: path.to_path_buf(),
            database_missing: false,
            created: !existed,
            migrations,
            fingerprint: Some(fingerprint),
        };

        if report.is_up_to_date() {
            info!("schema already up to date");
        } else {
            info!(applied = report.applied_count(), "schema migration committed");
        }
        Ok(report)
    }

    /// Returns the outcomes and the fingerprint of the schema being committed.
    fn apply_in_transaction(
        &self,
        conn: &mut Connection,
    ) -> Result<(Vec<MigrationOutcome>, String)> {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let applied = self
            .apply_all(&tx)
            .and_then(|outcomes| Ok((outcomes, schema_snapshot(&tx)?.fingerprint())));

        match applied {
            Ok(applied) => {
                tx.commit()?;
                Ok(applied)
            }
            Err(e) => {
                warn!(error = %e, "migration failed, rolling back");
                if let Err(rollback_err) = tx.rollback() {
                    warn!(error = %rollback_err, "rollback failed");
                }
                Err(e)
            }
        }
    }

    fn apply_all(&self, conn: &Connection) -> Result<Vec<MigrationOutcome>> {
        let mut outcomes = Vec::with_capacity(self.migrations.len());

        for migration in &self.migrations {
            debug!(migration = migration.name, "applying migration");
            let mut steps = Vec::with_capacity(migration.steps.len());

            for step in migration.steps {
                let status = match step.evaluate(conn)? {
                    StepState::Pending => {
                        debug!(migration = migration.name, step = %step, "applying step");
                        step.apply(conn)
                            .map_err(|e| Error::step(migration.name, step.to_string(), e))?;
                        StepStatus::Applied
                    }
                    StepState::Satisfied(reason) => {
                        debug!(migration = migration.name, step = %step, %reason, "skipping step");
                        StepStatus::Skipped(reason)
                    }
                    StepState::Blocked(_) => return Err(step.blocked_error()),
                };
                steps.push(StepOutcome { step: *step, status });
            }

            let outcome = MigrationOutcome {
                name: migration.name,
                steps,
            };
            if outcome.is_up_to_date() {
                info!(migration = migration.name, "migration already complete");
            } else {
                info!(
                    migration = migration.name,
                    applied = outcome.applied_count(),
                    "migration applied"
                );
            }
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    /// Evaluate every step without writing anything.
    ///
    /// A missing file is never created; it is planned against an empty schema.
    pub fn plan(&self, path: &Path) -> Result<MigrationPlan> {
        let exists = path.exists();
        let db = if exists {
            Database::open_read_only(path)?
        } else {
            Database::in_memory()?
        };

        let mut schema = PlannedSchema::new(db.connection());
        let mut migrations = Vec::with_capacity(self.migrations.len());

        for migration in &self.migrations {
            let mut steps = Vec::with_capacity(migration.steps.len());
            for step in migration.steps {
                let state = step.evaluate(&schema)?;
                if state == StepState::Pending {
                    schema.record(step);
                }
                steps.push(PlannedStep { step: *step, state });
            }
            migrations.push(PlannedMigration {
                name: migration.name,
                description: migration.description,
                steps,
            });
        }

        let fingerprint = if exists {
            Some(db.snapshot()?.fingerprint())
        } else {
            None
        };

        Ok(MigrationPlan {
            database: path.to_path_buf(),
            database_missing: !exists,
            would_create: !exists && self.creates_missing_database(),
            migrations,
            fingerprint,
        })
    }
}

impl Migrator<'static> {
    /// The full catalog, in order
    pub fn catalog() -> Self {
        Self::new(catalog::ALL)
    }

    /// A subset of the catalog by name. Catalog order is kept; duplicates collapse.
    pub fn select<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        for name in names {
            if catalog::find(name.as_ref()).is_none() {
                return Err(Error::UnknownMigration(name.as_ref().to_string()));
            }
        }
        Ok(Self::new(
            catalog::ALL
                .iter()
                .filter(|m| names.iter().any(|n| n.as_ref() == m.name)),
        ))
    }
}

impl Default for Migrator<'static> {
    fn default() -> Self {
        Self::catalog()
    }
}

/// Bring the database at `path` up to the current schema.
pub fn run_migration(path: impl AsRef<Path>) -> Result<MigrationReport> {
    Migrator::catalog().run(path.as_ref())
}
