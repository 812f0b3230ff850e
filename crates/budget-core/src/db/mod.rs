//! Direct SQLite access for schema inspection.
//!
//! The migrator never reads budget data; everything here looks at the
//! schema itself (`sqlite_master` and `pragma_table_info`).

pub mod types;

pub use types::*;

use crate::error::Result;
use rusqlite::{params, Connection, OpenFlags};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Busy timeout used by the desktop application's connection manager.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// First SQLite release with `ALTER TABLE ... RENAME COLUMN`.
pub const RENAME_COLUMN_MIN_VERSION: i32 = 3_025_000;

/// Database connection wrapper.
///
/// Owns its connection; the file is closed when the value is dropped.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if absent) a database for writing
    pub fn open_path(path: &Path, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        debug!(path = %path.display(), "opened database read-write");
        Ok(Self { conn })
    }

    /// Open an existing database without write access.
    ///
    /// Never creates the file: a missing path is reported as an error by SQLite.
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)?;
        debug!(path = %path.display(), "opened database read-only");
        Ok(Self { conn })
    }

    /// Open an in-memory database (tests and previews)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        table_exists(&self.conn, table)
    }

    pub fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        table_columns(&self.conn, table)
    }

    pub fn snapshot(&self) -> Result<SchemaSnapshot> {
        schema_snapshot(&self.conn)
    }

    /// Run `PRAGMA quick_check`; returns the reported problems (empty when healthy)
    pub fn quick_check(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("PRAGMA quick_check")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows.into_iter().filter(|r| r != "ok").collect())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Introspection helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Whether a table with this name exists (SQLite compares names case-insensitively)
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT count(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
        params![table],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Column metadata for a table, in declaration order. Empty when the table is absent.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare(
        "SELECT cid, name, type, \"notnull\", dflt_value, pk
         FROM pragma_table_info(?1)
         ORDER BY cid",
    )?;
    let columns = stmt
        .query_map(params![table], |row| {
            Ok(ColumnInfo {
                cid: row.get(0)?,
                name: row.get(1)?,
                decl_type: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                not_null: row.get::<_, i64>(3)? != 0,
                default_value: row.get(4)?,
                primary_key: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(columns)
}

/// Whether `table` has a column named `column` (SQLite compares names case-insensitively)
pub fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT count(*) > 0 FROM pragma_table_info(?1) WHERE name = ?2 COLLATE NOCASE",
        params![table, column],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Every user-defined object in `sqlite_master`, ordered by type then name
pub fn schema_snapshot(conn: &Connection) -> Result<SchemaSnapshot> {
    let mut stmt = conn.prepare(
        "SELECT type, name, tbl_name, sql FROM sqlite_master
         WHERE name NOT LIKE 'sqlite\\_%' ESCAPE '\\'
         ORDER BY type, name",
    )?;
    let objects = stmt
        .query_map([], |row| {
            Ok(SchemaObject {
                object_type: row.get(0)?,
                name: row.get(1)?,
                table_name: row.get(2)?,
                sql: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(SchemaSnapshot { objects })
}

/// Quote an identifier for use in DDL
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// SHA-256 of content, hex encoded
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Version string of the linked SQLite library
pub fn sqlite_version() -> &'static str {
    rusqlite::version()
}

/// Whether the linked SQLite supports `RENAME COLUMN`
pub fn supports_rename_column() -> bool {
    rusqlite::version_number() >= RENAME_COLUMN_MIN_VERSION
}
