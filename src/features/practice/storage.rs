//! Practice session storage.
//!
//! Persists practice sessions to the local database.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;

use super::session::{PracticeSession, SessionState};
use crate::error::BreatheError;
use crate::storage::Database;

const SESSION_COLUMNS: &str = "id, exercise, started_at, ended_at, target_cycles, \
                               cycles_completed, seconds_practiced, state";

/// Lifetime totals across all recorded sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PracticeTotals {
    /// Number of recorded sessions
    pub sessions: i64,
    /// Sessions that reached their target
    pub completed: i64,
    /// Total seconds practiced
    pub seconds: i64,
    /// Total full cycles
    pub cycles: i64,
}

/// Storage for practice sessions.
pub struct PracticeStorage {
    db: Database,
}

impl PracticeStorage {
    /// Open storage at the default database location.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn new() -> Result<Self, BreatheError> {
        let db = Database::open()?;
        Ok(Self { db })
    }

    /// Create storage with an existing database connection.
    #[must_use]
    pub const fn with_database(db: Database) -> Self {
        Self { db }
    }

    /// Save a session.
    ///
    /// If the session has an ID, it will be updated. Otherwise, it will be inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save(&self, session: &mut PracticeSession) -> Result<(), BreatheError> {
        if session.id.is_some() {
            self.update(session)
        } else {
            self.insert(session)
        }
    }

    fn insert(&self, session: &mut PracticeSession) -> Result<(), BreatheError> {
        let conn = self.db.connection();

        conn.execute(
            r"INSERT INTO practice_sessions
              (exercise, started_at, ended_at, target_cycles, cycles_completed, seconds_practiced, state)
              VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                session.exercise,
                session.started_at.to_rfc3339(),
                session.ended_at.map(|t| t.to_rfc3339()),
                session.target_cycles.map(to_sql_count),
                to_sql_count(session.cycles_completed),
                session.seconds_practiced,
                session.state.as_str(),
            ],
        )
        .map_err(|e| BreatheError::Database(format!("Failed to insert session: {e}")))?;

        session.id = Some(conn.last_insert_rowid());
        tracing::debug!(id = ?session.id, exercise = %session.exercise, "saved practice session");
        Ok(())
    }

    fn update(&self, session: &PracticeSession) -> Result<(), BreatheError> {
        let conn = self.db.connection();

        conn.execute(
            r"UPDATE practice_sessions SET
              exercise = ?1,
              started_at = ?2,
              ended_at = ?3,
              target_cycles = ?4,
              cycles_completed = ?5,
              seconds_practiced = ?6,
              state = ?7
              WHERE id = ?8",
            params![
                session.exercise,
                session.started_at.to_rfc3339(),
                session.ended_at.map(|t| t.to_rfc3339()),
                session.target_cycles.map(to_sql_count),
                to_sql_count(session.cycles_completed),
                session.seconds_practiced,
                session.state.as_str(),
                session.id,
            ],
        )
        .map_err(|e| BreatheError::Database(format!("Failed to update session: {e}")))?;

        Ok(())
    }

    /// Get a session by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get(&self, id: i64) -> Result<Option<PracticeSession>, BreatheError> {
        let conn = self.db.connection();

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM practice_sessions WHERE id = ?1"
            ))
            .map_err(|e| BreatheError::Database(format!("Failed to prepare query: {e}")))?;

        stmt.query_row([id], row_to_session)
            .optional()
            .map_err(|e| BreatheError::Database(format!("Failed to query session: {e}")))
    }

    /// Get the most recent sessions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_recent(&self, limit: usize) -> Result<Vec<PracticeSession>, BreatheError> {
        let conn = self.db.connection();

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM practice_sessions
                 ORDER BY started_at DESC, id DESC
                 LIMIT ?1"
            ))
            .map_err(|e| BreatheError::Database(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map([i64::try_from(limit).unwrap_or(i64::MAX)], row_to_session)
            .map_err(|e| BreatheError::Database(format!("Failed to query sessions: {e}")))?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row.map_err(|e| BreatheError::Database(e.to_string()))?);
        }

        Ok(sessions)
    }

    /// Get totals across all sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn totals(&self) -> Result<PracticeTotals, BreatheError> {
        let conn = self.db.connection();

        conn.query_row(
            r"SELECT COUNT(*),
                     COALESCE(SUM(state = 'completed'), 0),
                     COALESCE(SUM(seconds_practiced), 0),
                     COALESCE(SUM(cycles_completed), 0)
              FROM practice_sessions",
            [],
            |row| {
                Ok(PracticeTotals {
                    sessions: row.get(0)?,
                    completed: row.get(1)?,
                    seconds: row.get(2)?,
                    cycles: row.get(3)?,
                })
            },
        )
        .map_err(|e| BreatheError::Database(format!("Failed to query totals: {e}")))
    }

    /// Delete a session. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete(&self, id: i64) -> Result<bool, BreatheError> {
        let conn = self.db.connection();

        let rows = conn
            .execute("DELETE FROM practice_sessions WHERE id = ?1", [id])
            .map_err(|e| BreatheError::Database(format!("Failed to delete session: {e}")))?;

        Ok(rows > 0)
    }
}

fn to_sql_count(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn from_sql_count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .ok()
}

/// Convert a database row to a `PracticeSession`.
fn row_to_session(row: &Row<'_>) -> Result<PracticeSession, rusqlite::Error> {
    let id: i64 = row.get(0)?;
    let exercise: String = row.get(1)?;
    let started_at_str: String = row.get(2)?;
    let ended_at_str: Option<String> = row.get(3)?;
    let target_cycles: Option<i64> = row.get(4)?;
    let cycles_completed: i64 = row.get(5)?;
    let seconds_practiced: i64 = row.get(6)?;
    let state_str: String = row.get(7)?;

    Ok(PracticeSession {
        id: Some(id),
        exercise,
        started_at: parse_timestamp(&started_at_str).unwrap_or_else(Utc::now),
        ended_at: ended_at_str.as_deref().and_then(parse_timestamp),
        target_cycles: target_cycles.map(from_sql_count),
        cycles_completed: from_sql_count(cycles_completed),
        seconds_practiced,
        state: SessionState::parse(&state_str),
    })
}
