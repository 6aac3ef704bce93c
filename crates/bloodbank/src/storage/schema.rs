//! `SQLite` schema definitions for bloodbank.
//!
//! The database is a plain key-value table: each collection is one row
//! holding the whole JSON array. The `metadata` table exists before any
//! migration runs; everything else is created by a migration.

/// Key-value table, introduced by schema version 1.
pub const CREATE_KV_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// Bookkeeping table holding the schema version.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";
