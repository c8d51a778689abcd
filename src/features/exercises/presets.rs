//! Built-in exercises and the exercise catalog.

use super::exercise::Exercise;
use crate::core::PhaseDefinition;
use crate::error::BreatheError;

fn phases(spec: &[(&str, &str, i64)]) -> Vec<PhaseDefinition> {
    spec.iter()
        .map(|(key, label, secs)| PhaseDefinition::new(*key, *label, *secs))
        .collect()
}

fn aliases(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

/// The exercises shipped with breathe.
#[must_use]
pub fn builtin_exercises() -> Vec<Exercise> {
    vec![
        Exercise {
            slug: "bhramari".to_string(),
            name: "Bhramari".to_string(),
            description: "Humming bee breath: inhale deeply, exhale with a steady hum.".to_string(),
            aliases: aliases(&["bee", "humming"]),
            phases: phases(&[("inhale", "Inhale", 4), ("hum", "Hum & Exhale", 6)]),
            ambient_track: Some("bhramari_hum.mp3".to_string()),
        },
        Exercise {
            slug: "samavritti".to_string(),
            name: "Samavritti".to_string(),
            description: "Equal breathing: inhale, hold, exhale and hold for the same count."
                .to_string(),
            aliases: aliases(&["box", "sama-vritti", "square"]),
            phases: phases(&[
                ("inhale", "Inhale", 4),
                ("hold_in", "Hold", 4),
                ("exhale", "Exhale", 4),
                ("hold_out", "Hold", 4),
            ]),
            ambient_track: Some("ocean_waves.mp3".to_string()),
        },
        Exercise {
            slug: "relaxing".to_string(),
            name: "Relaxing Breath".to_string(),
            description: "The 4-7-8 pattern: a long hold and a slow exhale to settle down."
                .to_string(),
            aliases: aliases(&["478", "4-7-8"]),
            phases: phases(&[
                ("inhale", "Inhale", 4),
                ("hold", "Hold", 7),
                ("exhale", "Exhale", 8),
            ]),
            ambient_track: Some("soft_rain.mp3".to_string()),
        },
        Exercise {
            slug: "coherent".to_string(),
            name: "Coherent Breathing".to_string(),
            description: "Five seconds in, five seconds out, about six breaths a minute."
                .to_string(),
            aliases: aliases(&["resonant", "ujjayi"]),
            phases: phases(&[("inhale", "Inhale", 5), ("exhale", "Exhale", 5)]),
            ambient_track: Some("singing_bowl.mp3".to_string()),
        },
        Exercise {
            slug: "anulom-vilom".to_string(),
            name: "Anulom Vilom".to_string(),
            description: "Alternate nostril breathing, switching sides after every inhale."
                .to_string(),
            aliases: aliases(&["nadi-shodhana", "alternate"]),
            phases: phases(&[
                ("inhale_left", "Inhale Left", 4),
                ("exhale_right", "Exhale Right", 4),
                ("inhale_right", "Inhale Right", 4),
                ("exhale_left", "Exhale Left", 4),
            ]),
            ambient_track: Some("forest.mp3".to_string()),
        },
    ]
}

/// All exercises available to the user: built-ins plus config-defined ones.
#[derive(Debug, Clone)]
pub struct ExerciseCatalog {
    exercises: Vec<Exercise>,
}

impl ExerciseCatalog {
    /// Catalog of built-in exercises only.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            exercises: builtin_exercises(),
        }
    }

    /// Catalog of built-ins extended with `custom` exercises.
    ///
    /// A custom exercise replaces a built-in with the same slug.
    #[must_use]
    pub fn with_custom(custom: &[Exercise]) -> Self {
        let mut catalog = Self::builtin();
        for exercise in custom {
            match catalog
                .exercises
                .iter_mut()
                .find(|e| e.slug.eq_ignore_ascii_case(&exercise.slug))
            {
                Some(existing) => *existing = exercise.clone(),
                None => catalog.exercises.push(exercise.clone()),
            }
        }
        catalog
    }

    /// Look up an exercise by slug or alias.
    ///
    /// # Errors
    ///
    /// Returns `BreatheError::NotFound` if nothing matches.
    pub fn find(&self, name: &str) -> Result<&Exercise, BreatheError> {
        self.exercises
            .iter()
            .find(|e| e.slug.eq_ignore_ascii_case(name.trim()))
            .or_else(|| self.exercises.iter().find(|e| e.matches(name)))
            .ok_or_else(|| {
                BreatheError::NotFound(format!(
                    "exercise '{name}' (try 'breathe list' to see what is available)"
                ))
            })
    }

    /// Iterate over exercises in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, Exercise> {
        self.exercises.iter()
    }

    /// All exercises as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Exercise] {
        &self.exercises
    }

    /// Number of exercises.
    #[must_use]
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}

impl Default for ExerciseCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
