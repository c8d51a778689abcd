//! Config file commands.

use colored::Colorize;

use crate::cli::args::{ConfigCommands, OutputFormat};
use crate::config::{Config, Paths};
use crate::error::BreatheError;
use crate::output::to_json;

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if paths cannot be resolved or the file cannot be
/// written.
pub fn config(
    cmd: &ConfigCommands,
    current: &Config,
    format: OutputFormat,
) -> Result<String, BreatheError> {
    let paths = Paths::new()?;
    config_with(&paths, cmd, current, format)
}

fn config_with(
    paths: &Paths,
    cmd: &ConfigCommands,
    current: &Config,
    format: OutputFormat,
) -> Result<String, BreatheError> {
    match cmd {
        ConfigCommands::Show => match format {
            OutputFormat::Json => to_json(current),
            OutputFormat::Pretty => serde_yaml::to_string(current)
                .map_err(|e| BreatheError::Config(format!("Failed to serialize config: {e}"))),
        },

        ConfigCommands::Path => match format {
            OutputFormat::Json => to_json(&serde_json::json!({
                "config": paths.config_file,
                "database": paths.database,
            })),
            OutputFormat::Pretty => Ok(paths.config_file.display().to_string()),
        },

        ConfigCommands::Init { force } => {
            if paths.config_file.exists() && !force {
                return Err(BreatheError::Config(format!(
                    "{} already exists (use --force to overwrite)",
                    paths.config_file.display()
                )));
            }
            paths.ensure_dirs()?;
            Config::default().save_to_path(&paths.config_file)?;
            tracing::info!(path = %paths.config_file.display(), "wrote default config");

            match format {
                OutputFormat::Json => {
                    to_json(&serde_json::json!({ "written": paths.config_file }))
                }
                OutputFormat::Pretty => Ok(format!(
                    "Wrote {}",
                    paths.config_file.display()
                )
                .green()
                .to_string()),
            }
        }
    }
}
