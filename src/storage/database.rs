//! `SQLite` database connection.
//!
//! The database is stored at `~/.breathe/breathe.db` and holds the practice
//! session history.

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use crate::config::Paths;
use crate::error::BreatheError;

use super::migrations;

const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at the default location.
    ///
    /// Creates the data directory and runs migrations if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open() -> Result<Self, BreatheError> {
        let paths = Paths::new()?;
        paths.ensure_dirs()?;
        Self::open_at(&paths.database)
    }

    /// Open the database at a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_at(path: &Path) -> Result<Self, BreatheError> {
        let conn = Connection::open(path).map_err(|e| {
            BreatheError::Database(format!("Failed to open database {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "opened database");
        Self::prepare(conn)
    }

    /// Open an in-memory database (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_in_memory() -> Result<Self, BreatheError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            BreatheError::Database(format!("Failed to open in-memory database: {e}"))
        })?;
        Self::prepare(conn)
    }

    fn prepare(conn: Connection) -> Result<Self, BreatheError> {
        // A second process (TUI plus a one-off run) may hold the file briefly.
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| BreatheError::Database(format!("Failed to set busy timeout: {e}")))?;

        migrations::run(&conn)?;
        Ok(Self { conn })
    }

    /// Get the current schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    pub fn schema_version(&self) -> Result<i32, BreatheError> {
        migrations::get_version(&self.conn)
    }

    /// Get a reference to the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.schema_version().unwrap() > 0);
    }

    #[test]
    fn test_open_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let db = Database::open_at(&db_path).unwrap();
        assert!(db.schema_version().unwrap() > 0);
        assert!(db_path.exists());
    }

    #[test]
    fn test_reopen_database() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Open, write and close
        {
            let db = Database::open_at(&db_path).unwrap();
            db.connection()
                .execute(
                    "INSERT INTO practice_sessions (exercise, started_at, state)
                     VALUES ('bhramari', '2026-01-01T07:00:00+00:00', 'completed')",
                    [],
                )
                .unwrap();
        }

        // Reopen keeps existing rows
        {
            let db = Database::open_at(&db_path).unwrap();
            let count: i64 = db
                .connection()
                .query_row("SELECT COUNT(*) FROM practice_sessions", [], |row| row.get(0))
                .unwrap();
            assert_eq!(count, 1);
        }
    }
}
