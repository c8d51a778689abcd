//! Breathing exercise definitions.

use serde::{Deserialize, Serialize};

use crate::core::{cycle_seconds, PhaseDefinition, PhaseSequence};
use crate::error::ConfigurationError;

/// A named breathing exercise: a phase list plus presentation details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    /// Identifier used on the command line.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Short description.
    #[serde(default)]
    pub description: String,
    /// Alternative names accepted on the command line.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Phases of one cycle, in order.
    pub phases: Vec<PhaseDefinition>,
    /// Ambient track looped while the exercise runs.
    #[serde(default)]
    pub ambient_track: Option<String>,
}

impl Exercise {
    /// Validate the phases into a sequence.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if the phases are empty, contain a
    /// non-positive duration, or repeat a key.
    pub fn sequence(&self) -> Result<PhaseSequence, ConfigurationError> {
        PhaseSequence::new(self.phases.clone())
    }

    /// Length of one cycle in seconds, saturating for unvalidated phases.
    #[must_use]
    pub fn cycle_seconds(&self) -> i64 {
        cycle_seconds(&self.phases)
    }

    /// Compact timing summary, e.g. "4-7-8".
    #[must_use]
    pub fn pattern(&self) -> String {
        self.phases
            .iter()
            .map(|p| p.duration_seconds.to_string())
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Check if `name` refers to this exercise (slug or alias, case-insensitive).
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        let name = name.trim();
        self.slug.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}
