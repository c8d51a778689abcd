//! JSON output formatting for breathe.

use serde::Serialize;
use serde_json::json;

use crate::error::BreatheError;
use crate::features::exercises::Exercise;
use crate::features::practice::{PracticeSession, PracticeTotals};

/// Format the exercise catalog as JSON
///
/// # Errors
///
/// Returns `BreatheError::Parse` if JSON serialization fails.
pub fn format_exercises_json(exercises: &[Exercise]) -> Result<String, BreatheError> {
    let items: Vec<_> = exercises
        .iter()
        .map(|e| {
            json!({
                "slug": e.slug,
                "name": e.name,
                "pattern": e.pattern(),
                "cycle_seconds": e.cycle_seconds(),
                "aliases": e.aliases,
            })
        })
        .collect();

    let output = json!({
        "count": items.len(),
        "items": items
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format a single exercise as JSON
///
/// # Errors
///
/// Returns `BreatheError::Parse` if JSON serialization fails.
pub fn format_exercise_json(exercise: &Exercise) -> Result<String, BreatheError> {
    let mut value = serde_json::to_value(exercise)?;
    if let Some(map) = value.as_object_mut() {
        map.insert("cycle_seconds".to_string(), json!(exercise.cycle_seconds()));
        map.insert("pattern".to_string(), json!(exercise.pattern()));
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Format practice sessions as JSON
///
/// # Errors
///
/// Returns `BreatheError::Parse` if JSON serialization fails.
pub fn format_sessions_json(sessions: &[PracticeSession]) -> Result<String, BreatheError> {
    let output = json!({
        "count": sessions.len(),
        "items": sessions
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format practice totals as JSON
///
/// # Errors
///
/// Returns `BreatheError::Parse` if JSON serialization fails.
pub fn format_totals_json(totals: &PracticeTotals) -> Result<String, BreatheError> {
    Ok(serde_json::to_string_pretty(totals)?)
}

/// Generic JSON formatter for any serializable type
///
/// # Errors
///
/// Returns `BreatheError::Parse` if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, BreatheError> {
    Ok(serde_json::to_string_pretty(value)?)
}
