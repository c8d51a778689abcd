//! Output formatting for breathe.
//!
//! Formatters for exercises and practice history in pretty or JSON form,
//! plus the duration helpers shared with the runner and the TUI.

mod duration;
mod json;
mod pretty;

use crate::cli::args::OutputFormat;
use crate::error::BreatheError;
use crate::features::exercises::Exercise;
use crate::features::practice::{PracticeSession, PracticeTotals};

pub use duration::*;
pub use json::*;
pub use pretty::*;

/// Format the exercise catalog based on output format
///
/// # Errors
///
/// Returns `BreatheError::Parse` if JSON serialization fails.
pub fn format_exercises(
    exercises: &[Exercise],
    format: OutputFormat,
) -> Result<String, BreatheError> {
    match format {
        OutputFormat::Pretty => Ok(format_exercises_pretty(exercises)),
        OutputFormat::Json => format_exercises_json(exercises),
    }
}

/// Format a single exercise based on output format
///
/// # Errors
///
/// Returns `BreatheError::Parse` if JSON serialization fails.
pub fn format_exercise(exercise: &Exercise, format: OutputFormat) -> Result<String, BreatheError> {
    match format {
        OutputFormat::Pretty => Ok(format_exercise_pretty(exercise)),
        OutputFormat::Json => format_exercise_json(exercise),
    }
}

/// Format practice sessions based on output format
///
/// # Errors
///
/// Returns `BreatheError::Parse` if JSON serialization fails.
pub fn format_sessions(
    sessions: &[PracticeSession],
    format: OutputFormat,
) -> Result<String, BreatheError> {
    match format {
        OutputFormat::Pretty => Ok(format_sessions_pretty(sessions)),
        OutputFormat::Json => format_sessions_json(sessions),
    }
}

/// Format practice totals based on output format
///
/// # Errors
///
/// Returns `BreatheError::Parse` if JSON serialization fails.
pub fn format_totals(totals: &PracticeTotals, format: OutputFormat) -> Result<String, BreatheError> {
    match format {
        OutputFormat::Pretty => Ok(format_totals_pretty(totals)),
        OutputFormat::Json => format_totals_json(totals),
    }
}
