//! Database schema migrations for cadence.
//!
//! Migrations are versioned and applied automatically when opening the
//! database. The `schema_version` table tracks the current version.

use rusqlite::{Connection, Result as SqliteResult};

/// Apply all pending migrations to bring the database to the current
/// schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version, 0 for a fresh database.
fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or(0)
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// v1: habits, entries, objectives, key results, weekly challenges, kv.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS habits (
            id        TEXT PRIMARY KEY,
            name      TEXT NOT NULL,
            rule      TEXT,
            position  INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS habit_entries (
            habit_id  TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
            date      TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 1,
            PRIMARY KEY (habit_id, date)
        );

        CREATE TABLE IF NOT EXISTS objectives (
            id            TEXT PRIMARY KEY,
            pillar        TEXT NOT NULL,
            objective     TEXT NOT NULL,
            quarter_start TEXT NOT NULL,
            quarter_end   TEXT NOT NULL,
            archived      INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS key_results (
            id             TEXT PRIMARY KEY,
            objective_id   TEXT NOT NULL REFERENCES objectives(id) ON DELETE CASCADE,
            description    TEXT NOT NULL,
            current_value  REAL NOT NULL DEFAULT 0,
            target_value   REAL NOT NULL DEFAULT 0,
            baseline_value REAL,
            direction      TEXT NOT NULL,
            kind           TEXT NOT NULL,
            progress       REAL,
            punted         INTEGER NOT NULL DEFAULT 0,
            kr_order       INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS weekly_challenges (
            week_start TEXT NOT NULL,
            slot       INTEGER NOT NULL,
            protocol   TEXT NOT NULL,
            action     TEXT NOT NULL,
            story      TEXT NOT NULL DEFAULT 'null',
            completed  INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (week_start, slot)
        );

        CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_habit_entries_date ON habit_entries(date);
        CREATE INDEX IF NOT EXISTS idx_key_results_objective ON key_results(objective_id);",
    )?;
    set_schema_version(conn, 1)
}

/// v2: daily intentions.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS intentions (
            id           TEXT PRIMARY KEY,
            date         TEXT NOT NULL,
            text         TEXT NOT NULL,
            committed_at TEXT NOT NULL,
            completed    INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_intentions_date ON intentions(date);",
    )?;
    set_schema_version(conn, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 2);
    }
}
