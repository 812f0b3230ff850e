//! Run reports and dry-run plans.

use std::path::PathBuf;

use serde::Serialize;

use super::step::{MigrationStep, SchemaCondition, StepState};

/// What happened to a step during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum StepStatus {
    Applied,
    Skipped(SchemaCondition),
}

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step: MigrationStep,
    pub status: StepStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationOutcome {
    pub name: &'static str,
    pub steps: Vec<StepOutcome>,
}

impl MigrationOutcome {
    pub fn applied_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Applied)
            .count()
    }

    /// Every step was already in its target state
    pub fn is_up_to_date(&self) -> bool {
        self.applied_count() == 0
    }
}

/// Result of one migration run.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub database: PathBuf,
    /// The file did not exist and nothing selected asked for it to be created
    pub database_missing: bool,
    /// The file did not exist and was created by this run
    pub created: bool,
    pub migrations: Vec<MigrationOutcome>,
    /// Schema fingerprint after commit; `None` when no database was opened
    pub fingerprint: Option<String>,
}

impl MigrationReport {
    pub(crate) fn missing(database: PathBuf) -> Self {
        Self {
            database,
            database_missing: true,
            created: false,
            migrations: Vec::new(),
            fingerprint: None,
        }
    }

    pub fn applied_count(&self) -> usize {
        self.migrations.iter().map(|m| m.applied_count()).sum()
    }

    pub fn is_up_to_date(&self) -> bool {
        self.migrations.iter().all(|m| m.is_up_to_date())
    }

    pub fn migration(&self, name: &str) -> Option<&MigrationOutcome> {
        self.migrations.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedStep {
    pub step: MigrationStep,
    pub state: StepState,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedMigration {
    pub name: &'static str,
    pub description: &'static str,
    pub steps: Vec<PlannedStep>,
}

impl PlannedMigration {
    pub fn pending_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.state == StepState::Pending)
            .count()
    }

    pub fn blocked_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.state, StepState::Blocked(_)))
            .count()
    }
}

/// Dry-run view of what a run would do.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationPlan {
    pub database: PathBuf,
    pub database_missing: bool,
    /// Whether a run would create the missing file
    pub would_create: bool,
    pub migrations: Vec<PlannedMigration>,
    /// Fingerprint of the current schema; `None` when the file is missing
    pub fingerprint: Option<String>,
}

impl MigrationPlan {
    pub fn pending_count(&self) -> usize {
        self.migrations.iter().map(|m| m.pending_count()).sum()
    }

    pub fn blocked_count(&self) -> usize {
        self.migrations.iter().map(|m| m.blocked_count()).sum()
    }

    /// Nothing pending and nothing blocked
    pub fn is_up_to_date(&self) -> bool {
        self.pending_count() == 0 && self.blocked_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: MigrationStep = MigrationStep::AddColumn {
        table: "savings_goals",
        column: "status",
        definition: "TEXT DEFAULT 'active'",
    };

    #[test]
    fn test_outcome_counts() {
        let outcome = MigrationOutcome {
            name: "feature_enhancements",
            steps: vec![
                StepOutcome {
                    step: STEP,
                    status: StepStatus::Applied,
                },
                StepOutcome {
                    step: STEP,
                    status: StepStatus::Skipped(SchemaCondition::ColumnExists),
                },
            ],
        };
        assert_eq!(outcome.applied_count(), 1);
        assert!(!outcome.is_up_to_date());
    }

    #[test]
    fn test_missing_report_is_up_to_date() {
        let report = MigrationReport::missing(PathBuf::from("budget_tracker.db"));
        assert!(report.database_missing);
        assert!(report.is_up_to_date());
        assert_eq!(report.applied_count(), 0);
        assert!(report.fingerprint.is_none());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(StepStatus::Skipped(SchemaCondition::TargetColumnExists))
            .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "skipped", "reason": "target_column_exists"})
        );

        let json = serde_json::to_value(StepOutcome {
            step: STEP,
            status: StepStatus::Applied,
        })
        .unwrap();
        assert_eq!(json["step"]["kind"], "add_column");
        assert_eq!(json["step"]["column"], "status");
        assert_eq!(json["status"]["status"], "applied");
    }
}
