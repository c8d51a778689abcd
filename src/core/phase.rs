//! Phase definitions and validated, cyclic phase sequences.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Longest accepted phase, in seconds (24 hours).
pub const MAX_PHASE_SECONDS: i64 = 24 * 60 * 60;

/// A named segment of a breathing cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDefinition {
    /// Unique identifier within a sequence.
    pub key: String,
    /// Display name.
    pub label: String,
    /// Duration in whole seconds.
    pub duration_seconds: i64,
}

impl PhaseDefinition {
    /// Create a new phase definition.
    #[must_use]
    pub fn new(key: impl Into<String>, label: impl Into<String>, duration_seconds: i64) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            duration_seconds,
        }
    }

    /// Duration in milliseconds.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn duration_millis(&self) -> u64 {
        if self.duration_seconds <= 0 {
            return 0;
        }
        (self.duration_seconds as u64).saturating_mul(1000)
    }
}

/// An ordered, non-empty, cyclic list of phases.
///
/// After the last phase the sequence restarts at the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PhaseSequence {
    phases: Vec<PhaseDefinition>,
}

impl PhaseSequence {
    /// Validate a list of phases into a sequence.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if the list is empty, any duration is
    /// zero, negative or longer than [`MAX_PHASE_SECONDS`], or two phases
    /// share a key.
    pub fn new(phases: Vec<PhaseDefinition>) -> Result<Self, ConfigurationError> {
        if phases.is_empty() {
            return Err(ConfigurationError::EmptySequence);
        }

        let mut seen = HashSet::new();
        for phase in &phases {
            if phase.duration_seconds <= 0 {
                return Err(ConfigurationError::NonPositiveDuration {
                    key: phase.key.clone(),
                    duration_seconds: phase.duration_seconds,
                });
            }
            if phase.duration_seconds > MAX_PHASE_SECONDS {
                return Err(ConfigurationError::DurationTooLong {
                    key: phase.key.clone(),
                    duration_seconds: phase.duration_seconds,
                });
            }
            if !seen.insert(phase.key.as_str()) {
                return Err(ConfigurationError::DuplicateKey(phase.key.clone()));
            }
        }

        Ok(Self { phases })
    }

    /// Number of phases in one cycle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Never true for a validated sequence.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Get a phase by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PhaseDefinition> {
        self.phases.get(index)
    }

    /// The phase every cycle starts with.
    #[must_use]
    pub fn first(&self) -> &PhaseDefinition {
        &self.phases[0]
    }

    /// Index of the phase following `index`, wrapping to 0 after the last.
    #[must_use]
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.phases.len()
    }

    /// Length of one full cycle in seconds.
    #[must_use]
    pub fn cycle_seconds(&self) -> i64 {
        cycle_seconds(&self.phases)
    }

    /// Iterate over phases in order.
    pub fn iter(&self) -> std::slice::Iter<'_, PhaseDefinition> {
        self.phases.iter()
    }

    /// Borrow the phases as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[PhaseDefinition] {
        &self.phases
    }
}

/// Total duration of `phases` in seconds, saturating at `i64::MAX`.
///
/// Works on unvalidated phase lists as well.
#[must_use]
pub fn cycle_seconds(phases: &[PhaseDefinition]) -> i64 {
    phases
        .iter()
        .fold(0_i64, |total, p| total.saturating_add(p.duration_seconds))
}

impl TryFrom<Vec<PhaseDefinition>> for PhaseSequence {
    type Error = ConfigurationError;

    fn try_from(phases: Vec<PhaseDefinition>) -> Result<Self, Self::Error> {
        Self::new(phases)
    }
}

impl<'a> IntoIterator for &'a PhaseSequence {
    type Item = &'a PhaseDefinition;
    type IntoIter = std::slice::Iter<'a, PhaseDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.phases.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase(key: &str, secs: i64) -> PhaseDefinition {
        PhaseDefinition::new(key, key.to_uppercase(), secs)
    }

    #[test]
    fn test_sequence_valid() {
        let seq = PhaseSequence::new(vec![phase("a", 4), phase("b", 8)]).unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.first().key, "a");
        assert_eq!(seq.cycle_seconds(), 12);
        assert!(!seq.is_empty());
    }

    #[test]
    fn test_sequence_empty() {
        assert_eq!(
            PhaseSequence::new(vec![]),
            Err(ConfigurationError::EmptySequence)
        );
    }

    #[test]
    fn test_sequence_zero_duration() {
        let err = PhaseSequence::new(vec![phase("a", 4), phase("b", 0)]).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::NonPositiveDuration {
                key: "b".to_string(),
                duration_seconds: 0
            }
        );
    }

    #[test]
    fn test_sequence_negative_duration() {
        let err = PhaseSequence::new(vec![phase("a", -3)]).unwrap_err();
        assert!(matches!(err, ConfigurationError::NonPositiveDuration { .. }));
    }

    #[test]
    fn test_sequence_duplicate_key() {
        let err = PhaseSequence::new(vec![phase("hold", 4), phase("in", 4), phase("hold", 2)])
            .unwrap_err();
        assert_eq!(err, ConfigurationError::DuplicateKey("hold".to_string()));
    }

    #[test]
    fn test_next_index_wraps() {
        let seq = PhaseSequence::new(vec![phase("a", 1), phase("b", 1), phase("c", 1)]).unwrap();
        assert_eq!(seq.next_index(0), 1);
        assert_eq!(seq.next_index(1), 2);
        assert_eq!(seq.next_index(2), 0);
    }

    #[test]
    fn test_single_phase_wraps_to_itself() {
        let seq = PhaseSequence::new(vec![phase("hum", 6)]).unwrap();
        assert_eq!(seq.next_index(0), 0);
    }

    #[test]
    fn test_sequence_longest_accepted_duration() {
        let seq = PhaseSequence::new(vec![phase("a", MAX_PHASE_SECONDS), phase("b", 1)]).unwrap();
        assert_eq!(seq.cycle_seconds(), MAX_PHASE_SECONDS + 1);
        assert_eq!(seq.first().duration_millis(), 86_400_000);
    }

    #[test]
    fn test_sequence_duration_too_long() {
        let err = PhaseSequence::new(vec![phase("a", 4), phase("b", MAX_PHASE_SECONDS + 1)])
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DurationTooLong {
                key: "b".to_string(),
                duration_seconds: MAX_PHASE_SECONDS + 1
            }
        );

        let err = PhaseSequence::new(vec![phase("a", 100_000_000_000_000_000)]).unwrap_err();
        assert!(matches!(err, ConfigurationError::DurationTooLong { .. }));
    }

    #[test]
    fn test_duration_millis() {
        assert_eq!(phase("a", 4).duration_millis(), 4000);
        assert_eq!(phase("a", i64::MAX).duration_millis(), u64::MAX);
        assert_eq!(phase("a", -1).duration_millis(), 0);
    }

    #[test]
    fn test_cycle_seconds_saturates() {
        let phases = vec![phase("a", i64::MAX), phase("b", i64::MAX)];
        assert_eq!(cycle_seconds(&phases), i64::MAX);
        assert_eq!(cycle_seconds(&[]), 0);
    }

    #[test]
    fn test_deserialize_phase() {
        let yaml = "key: inhale\nlabel: Inhale\nduration_seconds: 4\n";
        let p: PhaseDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(p, PhaseDefinition::new("inhale", "Inhale", 4));
    }
}
