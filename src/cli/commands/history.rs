//! Practice history commands.

use colored::Colorize;

use crate::cli::args::{HistoryArgs, HistoryCommands, OutputFormat};
use crate::error::BreatheError;
use crate::features::practice::PracticeStorage;
use crate::output::{format_sessions, format_totals, to_json};

/// Execute history command against the default database.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or queried.
pub fn history(args: &HistoryArgs, format: OutputFormat) -> Result<String, BreatheError> {
    let storage = PracticeStorage::new()?;
    history_with(&storage, args, format)
}

/// Execute history command against `storage`.
///
/// # Errors
///
/// Returns an error if the query fails or a session to delete does not exist.
pub fn history_with(
    storage: &PracticeStorage,
    args: &HistoryArgs,
    format: OutputFormat,
) -> Result<String, BreatheError> {
    match args.command {
        None => {
            let sessions = storage.get_recent(args.limit)?;
            format_sessions(&sessions, format)
        }
        Some(HistoryCommands::Stats) => format_totals(&storage.totals()?, format),
        Some(HistoryCommands::Delete { id }) => {
            if !storage.delete(id)? {
                return Err(BreatheError::NotFound(format!("session {id}")));
            }
            match format {
                OutputFormat::Json => to_json(&serde_json::json!({ "deleted": id })),
                OutputFormat::Pretty => Ok(format!("Deleted session {id}").green().to_string()),
            }
        }
    }
}
