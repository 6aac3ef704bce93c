//! Versioned schema changes.
//!
//! The applied version lives in the `metadata` table. Each [`Migration`] is
//! applied inside its own transaction together with its version stamp, so a
//! database is never left between two versions.

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::error::{Error, Result};

use super::schema::{CREATE_KV_TABLE, CREATE_METADATA_TABLE};

const VERSION_KEY: &str = "schema_version";

/// One step forward in the schema.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    /// Version the database is at once this step is applied.
    pub version: i32,
    /// Short label for logs.
    pub description: &'static str,
    /// Statements to run.
    pub sql: &'static str,
}

/// Every migration, oldest first. Versions are consecutive from 1.
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "create kv_store",
    sql: CREATE_KV_TABLE,
}];

/// The version a fully migrated database reports.
#[must_use]
pub fn current_version() -> i32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Bring the schema of `conn` up to [`current_version`].
///
/// # Errors
///
/// Returns [`Error::DatabaseMigration`] if the database was written by a newer
/// build or holds an unreadable version, or a query error if a step fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_METADATA_TABLE)?;

    let applied = schema_version(conn)?;
    let latest = current_version();
    if applied > latest {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {applied} is newer than supported version {latest}"
            ),
        });
    }

    for migration in MIGRATIONS.iter().filter(|m| m.version > applied) {
        apply(conn, migration)?;
    }
    Ok(())
}

/// The applied schema version, or 0 for a fresh database.
///
/// # Errors
///
/// Returns an error if the stored version is not a number.
pub fn schema_version(conn: &Connection) -> Result<i32> {
    let stored: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    stored.map_or(Ok(0), |value| {
        value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        })
    })
}

fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.execute(
        "INSERT INTO metadata (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (VERSION_KEY, migration.version.to_string()),
    )?;
    tx.commit()?;

    info!(
        version = migration.version,
        description = migration.description,
        "Applied schema migration"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [name],
                |row| row.get(0),
            )
            .unwrap();
        count == 1
    }

    #[test]
    fn test_versions_are_consecutive() {
        for (index, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(migration.version, i32::try_from(index).unwrap() + 1);
        }
        assert_eq!(current_version(), 1);
    }

    #[test]
    fn test_fresh_database_gets_kv_store() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(!table_exists(&conn, "kv_store"));

        initialize_schema(&conn).unwrap();

        assert!(table_exists(&conn, "kv_store"));
        assert_eq!(schema_version(&conn).unwrap(), current_version());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO kv_store (key, value) VALUES ('k', 'v')",
            [],
        )
        .unwrap();

        initialize_schema(&conn).unwrap();

        let value: String = conn
            .query_row("SELECT value FROM kv_store WHERE key = 'k'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(value, "v");
        assert_eq!(schema_version(&conn).unwrap(), current_version());
    }

    #[test]
    fn test_unversioned_database_reports_zero() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(CREATE_METADATA_TABLE).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 0);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn.execute(
            "UPDATE metadata SET value = ?1 WHERE key = ?2",
            ((current_version() + 1).to_string(), VERSION_KEY),
        )
        .unwrap();

        let err = initialize_schema(&conn).unwrap_err();
        assert!(err.to_string().contains("newer than supported"));
    }

    #[test]
    fn test_invalid_version_value() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn.execute(
            "UPDATE metadata SET value = 'banana' WHERE key = ?1",
            [VERSION_KEY],
        )
        .unwrap();

        let err = schema_version(&conn).unwrap_err();
        assert!(err.to_string().contains("invalid schema version"));
    }

    #[test]
    fn test_failed_step_leaves_version_untouched() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(CREATE_METADATA_TABLE).unwrap();
        let broken = Migration {
            version: 1,
            description: "broken",
            sql: "CREATE TABLE partial (id INTEGER); NOT VALID SQL;",
        };

        assert!(apply(&conn, &broken).is_err());
        assert_eq!(schema_version(&conn).unwrap(), 0);
        assert!(!table_exists(&conn, "partial"));
    }
}
