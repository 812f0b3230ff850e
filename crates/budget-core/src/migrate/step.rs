//! Migration steps and the schema checks that make them idempotent.
//!
//! Every step is check-then-act: the live schema is inspected first and the
//! DDL is only issued when the target state is absent.

use std::collections::{HashMap, HashSet};
use std::fmt;

use rusqlite::Connection;
use serde::Serialize;

use crate::db::{self, quote_ident};
use crate::error::{Error, Result};

/// One idempotent structural change against a single table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MigrationStep {
    /// `CREATE TABLE IF NOT EXISTS table (definition)`.
    ///
    /// `definition` is the body between the parentheses, constraints included.
    CreateTable {
        table: &'static str,
        definition: &'static str,
    },
    /// `ALTER TABLE table ADD COLUMN column definition`, skipped if the column exists.
    AddColumn {
        table: &'static str,
        column: &'static str,
        definition: &'static str,
    },
    /// `ALTER TABLE table RENAME COLUMN from TO to`, only when `from` exists and `to` does not.
    RenameColumn {
        table: &'static str,
        from: &'static str,
        to: &'static str,
    },
}

/// Schema state observed when a step is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaCondition {
    TableExists,
    TableMissing,
    ColumnExists,
    TargetColumnExists,
    SourceColumnMissing,
}

impl fmt::Display for SchemaCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::TableExists => "table already exists",
            Self::TableMissing => "table does not exist",
            Self::ColumnExists => "column already exists",
            Self::TargetColumnExists => "target column already exists",
            Self::SourceColumnMissing => "source column not present",
        };
        f.write_str(text)
    }
}

/// Result of evaluating a step against a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum StepState {
    /// The step would change the schema
    Pending,
    /// The target state already holds; the step is a no-op
    Satisfied(SchemaCondition),
    /// The step cannot run against this schema
    Blocked(SchemaCondition),
}

impl MigrationStep {
    pub fn table(&self) -> &'static str {
        match self {
            Self::CreateTable { table, .. }
            | Self::AddColumn { table, .. }
            | Self::RenameColumn { table, .. } => table,
        }
    }

    /// The DDL issued when the step is pending
    pub fn sql(&self) -> String {
        match self {
            Self::CreateTable { table, definition } => format!(
                "CREATE TABLE IF NOT EXISTS {} ({})",
                quote_ident(table),
                definition
            ),
            Self::AddColumn {
                table,
                column,
                definition,
            } => format!(
                "ALTER TABLE {} ADD COLUMN {} {}",
                quote_ident(table),
                quote_ident(column),
                definition
            ),
            Self::RenameColumn { table, from, to } => format!(
                "ALTER TABLE {} RENAME COLUMN {} TO {}",
                quote_ident(table),
                quote_ident(from),
                quote_ident(to)
            ),
        }
    }

    /// Decide whether the step still has work to do
    pub fn evaluate<P: SchemaProbe + ?Sized>(&self, probe: &P) -> Result<StepState> {
        let state = match *self {
            Self::CreateTable { table, .. } => {
                if probe.has_table(table)? {
                    StepState::Satisfied(SchemaCondition::TableExists)
                } else {
                    StepState::Pending
                }
            }
            Self::AddColumn { table, column, .. } => {
                if !probe.has_table(table)? {
                    StepState::Blocked(SchemaCondition::TableMissing)
                } else if probe.has_column(table, column)? {
                    StepState::Satisfied(SchemaCondition::ColumnExists)
                } else {
                    StepState::Pending
                }
            }
            Self::RenameColumn { table, from, to } => {
                if !probe.has_table(table)? {
                    StepState::Satisfied(SchemaCondition::TableMissing)
                } else if probe.has_column(table, to)? {
                    StepState::Satisfied(SchemaCondition::TargetColumnExists)
                } else if !probe.has_column(table, from)? {
                    StepState::Satisfied(SchemaCondition::SourceColumnMissing)
                } else {
                    StepState::Pending
                }
            }
        };
        Ok(state)
    }

    /// Issue the DDL. Callers evaluate first.
    pub fn apply(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(&self.sql())
    }

    /// Error for a step that evaluated to `Blocked`. Only add-column steps block.
    pub(crate) fn blocked_error(&self) -> Error {
        let column = match *self {
            Self::AddColumn { column, .. } => column,
            Self::CreateTable { .. } | Self::RenameColumn { .. } => "",
        };
        Error::MissingTable {
            table: self.table().to_string(),
            column: column.to_string(),
        }
    }
}

impl fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateTable { table, .. } => write!(f, "create table {table}"),
            Self::AddColumn { table, column, .. } => write!(f, "add column {table}.{column}"),
            Self::RenameColumn { table, from, to } => {
                write!(f, "rename column {table}.{from} to {to}")
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Schema probes
// ─────────────────────────────────────────────────────────────────────────────

/// Read-only view of a schema that steps are evaluated against.
pub trait SchemaProbe {
    fn has_table(&self, table: &str) -> Result<bool>;
    fn has_column(&self, table: &str, column: &str) -> Result<bool>;
}

impl SchemaProbe for Connection {
    fn has_table(&self, table: &str) -> Result<bool> {
        db::table_exists(self, table)
    }

    fn has_column(&self, table: &str, column: &str) -> Result<bool> {
        db::column_exists(self, table, column)
    }
}

/// Live schema plus the simulated effect of steps recorded so far.
///
/// Used for dry runs: nothing is written, but later steps see the tables and
/// columns that earlier pending steps would have produced.
pub struct PlannedSchema<'c> {
    live: &'c Connection,
    created: HashMap<String, HashSet<String>>,
    added: HashSet<(String, String)>,
    removed: HashSet<(String, String)>,
}

impl<'c> PlannedSchema<'c> {
    pub fn new(live: &'c Connection) -> Self {
        Self {
            live,
            created: HashMap::new(),
            added: HashSet::new(),
            removed: HashSet::new(),
        }
    }

    /// Record the effect of a pending step
    pub fn record(&mut self, step: &MigrationStep) {
        match *step {
            MigrationStep::CreateTable { table, definition } => {
                let columns = definition_columns(definition)
                    .into_iter()
                    .map(|c| c.to_ascii_lowercase())
                    .collect();
                self.created.insert(table.to_ascii_lowercase(), columns);
            }
            MigrationStep::AddColumn { table, column, .. } => {
                let key = column_key(table, column);
                self.removed.remove(&key);
                self.added.insert(key);
            }
            MigrationStep::RenameColumn { table, from, to } => {
                let from_key = column_key(table, from);
                self.added.remove(&from_key);
                self.removed.insert(from_key);
                let to_key = column_key(table, to);
                self.removed.remove(&to_key);
                self.added.insert(to_key);
            }
        }
    }
}

impl SchemaProbe for PlannedSchema<'_> {
    fn has_table(&self, table: &str) -> Result<bool> {
        if self.created.contains_key(&table.to_ascii_lowercase()) {
            return Ok(true);
        }
        self.live.has_table(table)
    }

    fn has_column(&self, table: &str, column: &str) -> Result<bool> {
        let key = column_key(table, column);
        if self.added.contains(&key) {
            return Ok(true);
        }
        if self.removed.contains(&key) {
            return Ok(false);
        }
        if let Some(columns) = self.created.get(&key.0) {
            return Ok(columns.contains(&key.1));
        }
        self.live.has_column(table, column)
    }
}

fn column_key(table: &str, column: &str) -> (String, String) {
    (table.to_ascii_lowercase(), column.to_ascii_lowercase())
}

/// Column names declared in a `CREATE TABLE` body, skipping table constraints.
pub fn definition_columns(definition: &str) -> Vec<String> {
    const CONSTRAINT_KEYWORDS: [&str; 5] = ["UNIQUE", "PRIMARY", "FOREIGN", "CHECK", "CONSTRAINT"];

    split_top_level(definition)
        .into_iter()
        .filter_map(|item| {
            let first = item.split_whitespace().next()?;
            let upper = first.to_ascii_uppercase();
            let keyword = upper.split('(').next().unwrap_or_default();
            if CONSTRAINT_KEYWORDS.contains(&keyword) {
                return None;
            }
            Some(
                first
                    .trim_matches(|c| matches!(c, '"' | '`' | '[' | ']'))
                    .to_string(),
            )
        })
        .collect()
}

/// Split on commas that are not nested inside parentheses
fn split_top_level(definition: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in definition.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(definition[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(definition[start..].trim());
    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOTS: MigrationStep = MigrationStep::RenameColumn {
        table: "net_worth_snapshots",
        from: "jeff_total",
        to: "user_a_total",
    };

    fn conn_with(sql: &str) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(sql).unwrap();
        conn
    }

    #[test]
    fn test_sql_generation() {
        let create = MigrationStep::CreateTable {
            table: "t",
            definition: "id INTEGER PRIMARY KEY",
        };
        assert_eq!(create.sql(), "CREATE TABLE IF NOT EXISTS \"t\" (id INTEGER PRIMARY KEY)");

        let add = MigrationStep::AddColumn {
            table: "savings_goals",
            column: "status",
            definition: "TEXT DEFAULT 'active'",
        };
        assert_eq!(
            add.sql(),
            "ALTER TABLE \"savings_goals\" ADD COLUMN \"status\" TEXT DEFAULT 'active'"
        );

        assert_eq!(
            SNAPSHOTS.sql(),
            "ALTER TABLE \"net_worth_snapshots\" RENAME COLUMN \"jeff_total\" TO \"user_a_total\""
        );
        assert_eq!(SNAPSHOTS.to_string(), "rename column net_worth_snapshots.jeff_total to user_a_total");
    }

    #[test]
    fn test_add_column_states() {
        let step = MigrationStep::AddColumn {
            table: "budget_estimates",
            column: "is_default",
            definition: "BOOLEAN DEFAULT 0",
        };

        let empty = conn_with("");
        assert_eq!(
            step.evaluate(&empty).unwrap(),
            StepState::Blocked(SchemaCondition::TableMissing)
        );

        let without = conn_with("CREATE TABLE budget_estimates (id INTEGER);");
        assert_eq!(step.evaluate(&without).unwrap(), StepState::Pending);

        let with = conn_with("CREATE TABLE budget_estimates (id INTEGER, is_default BOOLEAN);");
        assert_eq!(
            step.evaluate(&with).unwrap(),
            StepState::Satisfied(SchemaCondition::ColumnExists)
        );
    }

    #[test]
    fn test_rename_states() {
        let empty = conn_with("");
        assert_eq!(
            SNAPSHOTS.evaluate(&empty).unwrap(),
            StepState::Satisfied(SchemaCondition::TableMissing)
        );

        let old = conn_with("CREATE TABLE net_worth_snapshots (id INTEGER, jeff_total REAL);");
        assert_eq!(SNAPSHOTS.evaluate(&old).unwrap(), StepState::Pending);

        let new = conn_with("CREATE TABLE net_worth_snapshots (id INTEGER, user_a_total REAL);");
        assert_eq!(
            SNAPSHOTS.evaluate(&new).unwrap(),
            StepState::Satisfied(SchemaCondition::TargetColumnExists)
        );

        let neither = conn_with("CREATE TABLE net_worth_snapshots (id INTEGER);");
        assert_eq!(
            SNAPSHOTS.evaluate(&neither).unwrap(),
            StepState::Satisfied(SchemaCondition::SourceColumnMissing)
        );

        // Both present: never clobber the target
        let both = conn_with(
            "CREATE TABLE net_worth_snapshots (id INTEGER, jeff_total REAL, user_a_total REAL);",
        );
        assert_eq!(
            SNAPSHOTS.evaluate(&both).unwrap(),
            StepState::Satisfied(SchemaCondition::TargetColumnExists)
        );
    }

    #[test]
    fn test_definition_columns_skips_constraints() {
        let columns = definition_columns(
            "id INTEGER PRIMARY KEY AUTOINCREMENT,
             goal_id INTEGER NOT NULL,
             amount REAL NOT NULL DEFAULT (0.0),
             UNIQUE(goal_id, amount),
             FOREIGN KEY (goal_id) REFERENCES savings_goals (id)",
        );
        assert_eq!(columns, vec!["id", "goal_id", "amount"]);
    }

    #[test]
    fn test_planned_schema_sees_earlier_steps() {
        let live = conn_with("CREATE TABLE net_worth_snapshots (id INTEGER, jeff_total REAL);");
        let mut planned = PlannedSchema::new(&live);

        let create = MigrationStep::CreateTable {
            table: "bank_transactions",
            definition: "id INTEGER PRIMARY KEY, description TEXT",
        };
        let add = MigrationStep::AddColumn {
            table: "bank_transactions",
            column: "comment",
            definition: "TEXT",
        };

        assert_eq!(
            add.evaluate(&planned).unwrap(),
            StepState::Blocked(SchemaCondition::TableMissing)
        );
        planned.record(&create);
        assert_eq!(add.evaluate(&planned).unwrap(), StepState::Pending);
        planned.record(&add);
        assert_eq!(
            add.evaluate(&planned).unwrap(),
            StepState::Satisfied(SchemaCondition::ColumnExists)
        );

        assert_eq!(SNAPSHOTS.evaluate(&planned).unwrap(), StepState::Pending);
        planned.record(&SNAPSHOTS);
        assert!(!planned.has_column("net_worth_snapshots", "jeff_total").unwrap());
        assert!(planned.has_column("net_worth_snapshots", "user_a_total").unwrap());

        // Nothing was written
        assert!(!live.has_table("bank_transactions").unwrap());
    }
}
