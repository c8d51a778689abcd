//! Database migrations for breathe.
//!
//! Each migration upgrades the schema by one version and is tracked in
//! `PRAGMA user_version`. Migrations run when the database is opened.

use rusqlite::Connection;

use crate::error::BreatheError;

/// Current schema version.
const CURRENT_VERSION: i32 = 2;

/// Get the current schema version from the database.
///
/// Returns 0 for a new database.
///
/// # Errors
///
/// Returns an error if the pragma cannot be read.
pub fn get_version(conn: &Connection) -> Result<i32, BreatheError> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| BreatheError::Database(format!("Failed to get schema version: {e}")))
}

fn set_version(conn: &Connection, version: i32) -> Result<(), BreatheError> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))
        .map_err(|e| BreatheError::Database(format!("Failed to set schema version: {e}")))
}

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if a migration fails or the database is newer than
/// this build understands.
pub fn run(conn: &Connection) -> Result<(), BreatheError> {
    let current = get_version(conn)?;

    if current > CURRENT_VERSION {
        return Err(BreatheError::Database(format!(
            "database schema v{current} is newer than supported v{CURRENT_VERSION}"
        )));
    }

    for version in (current + 1)..=CURRENT_VERSION {
        tracing::debug!(version, "running migration");
        run_migration(conn, version)?;
        set_version(conn, version)?;
    }

    Ok(())
}

fn run_migration(conn: &Connection, version: i32) -> Result<(), BreatheError> {
    match version {
        1 => migrate_v1(conn),
        2 => migrate_v2(conn),
        _ => Err(BreatheError::Database(format!(
            "Unknown migration version: {version}"
        ))),
    }
}

/// Migration v1: practice session history.
fn migrate_v1(conn: &Connection) -> Result<(), BreatheError> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS practice_sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            exercise TEXT NOT NULL,
            started_at TEXT NOT NULL,
            ended_at TEXT,
            target_cycles INTEGER,
            cycles_completed INTEGER NOT NULL DEFAULT 0,
            seconds_practiced INTEGER NOT NULL DEFAULT 0,
            state TEXT NOT NULL DEFAULT 'running'
        );

        CREATE INDEX IF NOT EXISTS idx_practice_sessions_started
        ON practice_sessions(started_at);
        ",
    )
    .map_err(|e| BreatheError::Database(format!("Migration v1 failed: {e}")))
}

/// Migration v2: index for per-exercise history.
fn migrate_v2(conn: &Connection) -> Result<(), BreatheError> {
    conn.execute_batch(
        r"
        CREATE INDEX IF NOT EXISTS idx_practice_sessions_exercise
        ON practice_sessions(exercise);
        ",
    )
    .map_err(|e| BreatheError::Database(format!("Migration v2 failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_create_schema() {
        let conn = Connection::open_in_memory().unwrap();

        run(&conn).unwrap();
        assert_eq!(get_version(&conn).unwrap(), CURRENT_VERSION);

        conn.execute(
            "INSERT INTO practice_sessions (exercise, started_at, target_cycles, state)
             VALUES ('bhramari', '2026-01-01T07:00:00+00:00', 5, 'running')",
            [],
        )
        .unwrap();
    }

    #[test]
    fn test_migration_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        run(&conn).unwrap();
        run(&conn).unwrap();

        assert_eq!(get_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_upgrade_from_v1() {
        let conn = Connection::open_in_memory().unwrap();
        migrate_v1(&conn).unwrap();
        set_version(&conn, 1).unwrap();

        run(&conn).unwrap();
        assert_eq!(get_version(&conn).unwrap(), CURRENT_VERSION);

        let indexes: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'index' AND name = 'idx_practice_sessions_exercise'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(indexes, 1);
    }

    #[test]
    fn test_newer_schema_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        set_version(&conn, CURRENT_VERSION + 1).unwrap();
        assert!(matches!(run(&conn), Err(BreatheError::Database(_))));
    }

    #[test]
    fn test_get_version_new_database() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(get_version(&conn).unwrap(), 0);
    }
}
