//! Exercise catalog commands.

use super::catalog;
use crate::cli::args::OutputFormat;
use crate::config::Config;
use crate::error::BreatheError;
use crate::output::{format_exercise, format_exercises};

/// Execute list command
///
/// # Errors
///
/// Returns `BreatheError::Configuration` if any exercise has invalid phases,
/// or an error if output formatting fails.
pub fn list(config: &Config, format: OutputFormat) -> Result<String, BreatheError> {
    let catalog = catalog(config);
    for exercise in catalog.as_slice() {
        exercise.sequence().map_err(|e| {
            tracing::warn!(exercise = %exercise.slug, error = %e, "invalid exercise in config");
            e
        })?;
    }
    format_exercises(catalog.as_slice(), format)
}

/// Execute show command
///
/// # Errors
///
/// Returns `BreatheError::NotFound` for an unknown exercise and
/// `BreatheError::Configuration` if its phases are invalid.
pub fn show(config: &Config, name: &str, format: OutputFormat) -> Result<String, BreatheError> {
    let catalog = catalog(config);
    let exercise = catalog.find(name)?;
    exercise.sequence()?;
    format_exercise(exercise, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PhaseDefinition;
    use crate::features::exercises::Exercise;

    #[test]
    fn test_list_includes_custom() {
        let mut config = Config::default();
        config.exercises.push(Exercise {
            slug: "evening".to_string(),
            name: "Evening".to_string(),
            description: String::new(),
            aliases: vec![],
            phases: vec![PhaseDefinition::new("in", "In", 4)],
            ambient_track: None,
        });

        let output = list(&config, OutputFormat::Json).unwrap();
        assert!(output.contains("\"evening\""));
        assert!(output.contains("\"bhramari\""));
    }

    #[test]
    fn test_show_by_alias() {
        let output = show(&Config::default(), "478", OutputFormat::Json).unwrap();
        assert!(output.contains("\"slug\": \"relaxing\""));
    }

    #[test]
    fn test_list_rejects_oversized_custom() {
        let mut config = Config::default();
        config.exercises.push(Exercise {
            slug: "marathon".to_string(),
            name: "Marathon".to_string(),
            description: String::new(),
            aliases: vec![],
            phases: vec![
                PhaseDefinition::new("in", "In", i64::MAX),
                PhaseDefinition::new("out", "Out", i64::MAX),
            ],
            ambient_track: None,
        });

        assert!(matches!(
            list(&config, OutputFormat::Pretty),
            Err(BreatheError::Configuration(
                crate::error::ConfigurationError::DurationTooLong { .. }
            ))
        ));
    }

    #[test]
    fn test_show_invalid_custom() {
        let mut config = Config::default();
        config.exercises.push(Exercise {
            slug: "empty".to_string(),
            name: "Empty".to_string(),
            description: String::new(),
            aliases: vec![],
            phases: vec![],
            ambient_track: None,
        });

        assert!(matches!(
            show(&config, "empty", OutputFormat::Pretty),
            Err(BreatheError::Configuration(_))
        ));
    }
}
