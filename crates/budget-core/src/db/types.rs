//! Schema introspection types.

use serde::Serialize;

/// One row of `pragma_table_info` for a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub cid: i64,
    pub name: String,
    /// Declared type, empty when the column was declared without one
    pub decl_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    /// 1-based position in the primary key, 0 when not part of it
    pub primary_key: i64,
}

/// A schema object as recorded in `sqlite_master`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaObject {
    pub object_type: String,
    pub name: String,
    pub table_name: String,
    pub sql: Option<String>,
}

/// Canonical, ordered view of every user-defined schema object in a database.
///
/// Two databases with equal snapshots have byte-identical DDL in
/// `sqlite_master`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaSnapshot {
    pub objects: Vec<SchemaObject>,
}

impl SchemaSnapshot {
    /// Canonical text form: one line per object, `type|name|tbl_name|sql`.
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        for object in &self.objects {
            out.push_str(&object.object_type);
            out.push('|');
            out.push_str(&object.name);
            out.push('|');
            out.push_str(&object.table_name);
            out.push('|');
            out.push_str(object.sql.as_deref().unwrap_or(""));
            out.push('\n');
        }
        out
    }

    /// SHA-256 fingerprint of the canonical text, hex encoded.
    pub fn fingerprint(&self) -> String {
        crate::db::content_hash(&self.canonical())
    }

    /// Names of all tables in the snapshot
    pub fn table_names(&self) -> Vec<&str> {
        self.objects
            .iter()
            .filter(|o| o.object_type == "table")
            .map(|o| o.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(object_type: &str, name: &str, sql: Option<&str>) -> SchemaObject {
        SchemaObject {
            object_type: object_type.to_string(),
            name: name.to_string(),
            table_name: name.to_string(),
            sql: sql.map(str::to_string),
        }
    }

    #[test]
    fn test_canonical_text() {
        let snapshot = SchemaSnapshot {
            objects: vec![
                object("table", "income", Some("CREATE TABLE income (id INTEGER)")),
                object("index", "sqlite_autoindex_income_1", None),
            ],
        };

        assert_eq!(
            snapshot.canonical(),
            "table|income|income|CREATE TABLE income (id INTEGER)\n\
             index|sqlite_autoindex_income_1|sqlite_autoindex_income_1|\n"
        );
        assert_eq!(snapshot.table_names(), vec!["income"]);
    }

    #[test]
    fn test_fingerprint_tracks_ddl() {
        let a = SchemaSnapshot {
            objects: vec![object("table", "t", Some("CREATE TABLE t (a)"))],
        };
        let b = SchemaSnapshot {
            objects: vec![object("table", "t", Some("CREATE TABLE t (a, b)"))],
        };

        assert_eq!(a.fingerprint().len(), 64);
        assert_eq!(a.fingerprint(), a.clone().fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
