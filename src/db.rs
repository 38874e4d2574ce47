// ==========================================
// Fieldwork costing - SQLite connection setup
// ==========================================
// Goals:
// - every Connection::open goes through the same PRAGMAs
//   (foreign keys are per connection; cascades depend on them)
// - one busy_timeout for all writers
// - one idempotent schema for the element-costs store and config_kv
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// Default busy_timeout (ms)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// schema_version written by `init_schema`
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Apply the shared PRAGMAs to a connection
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the shared PRAGMAs
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Create every table this crate reads or writes (idempotent)
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS project_types (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS element_costs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_type_id INTEGER NOT NULL
                REFERENCES project_types(id) ON DELETE CASCADE,
            subtitle_code TEXT NOT NULL,
            subtitle_1 TEXT,
            subtitle_2 TEXT,
            subtitle_3 TEXT,
            subtitle_4 TEXT,
            subtitle_5 TEXT,
            row_order INTEGER NOT NULL DEFAULT 0,
            unit TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_element_costs_code
            ON element_costs(project_type_id, subtitle_code);

        CREATE TABLE IF NOT EXISTS element_costs_values (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            element_cost_id INTEGER NOT NULL
                REFERENCES element_costs(id) ON DELETE CASCADE,
            level TEXT NOT NULL,
            length_min INTEGER NOT NULL,
            length_max INTEGER NOT NULL,
            cost_value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_element_costs_values_element
            ON element_costs_values(element_cost_id, level);

        CREATE TABLE IF NOT EXISTS project_metadata (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_type_id INTEGER NOT NULL UNIQUE
                REFERENCES project_types(id) ON DELETE CASCADE,
            levels TEXT NOT NULL DEFAULT '[]',
            lengths TEXT NOT NULL DEFAULT '[]'
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// Read schema_version (None when the table does not exist)
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);

        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        let on: i64 = conn.query_row("PRAGMA foreign_keys", [], |r| r.get(0)).unwrap();
        assert_eq!(on, 1);
    }
}
