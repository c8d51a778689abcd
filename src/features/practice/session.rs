//! Practice session records.

use chrono::{DateTime, Duration, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::output::format_duration_short;

/// State of a practice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Exercise is in progress
    Running,
    /// Target number of cycles reached
    Completed,
    /// Stopped before the target
    Abandoned,
}

impl SessionState {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }

    /// Parse the storage representation. Unknown values read as abandoned.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "running" => Self::Running,
            "completed" => Self::Completed,
            _ => Self::Abandoned,
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "Running"),
            Self::Completed => write!(f, "Completed"),
            Self::Abandoned => write!(f, "Abandoned"),
        }
    }
}

/// One sitting with one exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeSession {
    /// Database ID (None if not persisted)
    pub id: Option<i64>,
    /// Exercise slug
    pub exercise: String,
    /// When the exercise started
    pub started_at: DateTime<Utc>,
    /// When it ended (None while running)
    pub ended_at: Option<DateTime<Utc>>,
    /// Cycles the user asked for (None for open-ended practice)
    pub target_cycles: Option<u64>,
    /// Full cycles actually completed
    pub cycles_completed: u64,
    /// Seconds spent breathing
    pub seconds_practiced: i64,
    /// Current state
    pub state: SessionState,
}

impl PracticeSession {
    /// Begin a new session now.
    #[must_use]
    pub fn begin(exercise: impl Into<String>, target_cycles: Option<u64>) -> Self {
        Self {
            id: None,
            exercise: exercise.into(),
            started_at: Utc::now(),
            ended_at: None,
            target_cycles,
            cycles_completed: 0,
            seconds_practiced: 0,
            state: SessionState::Running,
        }
    }

    /// Close the session with the final tally.
    ///
    /// The session is completed when the target was met (or there was no
    /// target and at least one cycle finished), otherwise abandoned.
    pub fn finish(&mut self, cycles_completed: u64, seconds_practiced: i64) {
        self.cycles_completed = cycles_completed;
        self.seconds_practiced = seconds_practiced.max(0);
        self.ended_at = Some(Utc::now());

        let reached = match self.target_cycles {
            Some(target) => cycles_completed >= target,
            None => cycles_completed > 0,
        };
        self.state = if reached {
            SessionState::Completed
        } else {
            SessionState::Abandoned
        };
    }

    /// Time spent breathing.
    #[must_use]
    pub fn practiced(&self) -> Duration {
        Duration::seconds(self.seconds_practiced)
    }

    /// Check if the session is still open.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == SessionState::Running
    }

    /// Start time in local timezone.
    #[must_use]
    pub fn started_at_local(&self) -> DateTime<Local> {
        self.started_at.with_timezone(&Local)
    }

    /// One-line summary.
    #[must_use]
    pub fn format_status(&self) -> String {
        let cycles = match self.target_cycles {
            Some(target) => format!("{}/{target} cycles", self.cycles_completed),
            None => format!("{} cycles", self.cycles_completed),
        };
        format!(
            "{} - {cycles}, {} [{}]",
            self.exercise,
            format_duration_short(self.practiced()),
            self.state
        )
    }
}
