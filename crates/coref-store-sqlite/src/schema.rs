//! SQL schema for the SQLite ordered store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per logical table registered through setup_namespace.
CREATE TABLE IF NOT EXISTS namespaces (
    table_name  TEXT PRIMARY KEY,
    key_schema  TEXT NOT NULL    -- JSON array of field types, e.g. [\"str\",\"u64\"]
);

-- Keys are order-preserving encoded tuples. BLOB comparison is memcmp, so
-- `ORDER BY key` is unsigned lexicographic order.
CREATE TABLE IF NOT EXISTS kv_rows (
    table_name  TEXT NOT NULL REFERENCES namespaces(table_name),
    key         BLOB NOT NULL,
    value       BLOB NOT NULL,
    PRIMARY KEY (table_name, key)
) WITHOUT ROWID;

PRAGMA user_version = 1;
";
