//! Ad-hoc breathing patterns from the command line.
//!
//! Two notations are accepted:
//! - positional counts: `"4-7-8"`, `"4-4-4-4"`, `"5/5"`. Labels follow the
//!   position (Inhale, Hold, Exhale, Hold); a zero count skips that phase.
//! - named phases: `"inhale:4, hold:7, exhale:8"`. Repeated names get a
//!   numbered key so they stay unique.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::exercise::Exercise;
use crate::core::PhaseDefinition;
use crate::error::BreatheError;

static POSITIONAL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+(?:\s*[-/]\s*\d+)*$")
        .unwrap_or_else(|e| panic!("Invalid positional regex: {e}"))
});

static NAMED_PHASE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9 _&-]*?)\s*[:=]\s*(-?\d+)\s*(?:s|sec|secs|seconds)?$")
        .unwrap_or_else(|e| panic!("Invalid named phase regex: {e}"))
});

/// Labels for one to four positional counts.
fn positional_labels(count: usize) -> Option<&'static [(&'static str, &'static str)]> {
    match count {
        1 => Some(&[("breathe", "Breathe")]),
        2 => Some(&[("inhale", "Inhale"), ("exhale", "Exhale")]),
        3 => Some(&[("inhale", "Inhale"), ("hold", "Hold"), ("exhale", "Exhale")]),
        4 => Some(&[
            ("inhale", "Inhale"),
            ("hold_in", "Hold"),
            ("exhale", "Exhale"),
            ("hold_out", "Hold"),
        ]),
        _ => None,
    }
}

/// Parse a pattern string into phases.
///
/// The result is not yet validated as a sequence.
///
/// # Errors
///
/// Returns `BreatheError::InvalidInput` if the string matches neither
/// notation.
pub fn parse_pattern(input: &str) -> Result<Vec<PhaseDefinition>, BreatheError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(BreatheError::InvalidInput("empty breathing pattern".to_string()));
    }

    if POSITIONAL_PATTERN.is_match(input) {
        parse_positional(input)
    } else {
        parse_named(input)
    }
}

fn parse_positional(input: &str) -> Result<Vec<PhaseDefinition>, BreatheError> {
    let counts = input
        .split(['-', '/'])
        .map(|part| {
            part.trim().parse::<i64>().map_err(|e| {
                BreatheError::InvalidInput(format!("invalid count '{part}' in pattern: {e}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let labels = positional_labels(counts.len()).ok_or_else(|| {
        BreatheError::InvalidInput(format!(
            "positional patterns take 1 to 4 counts, got {}; use names like 'inhale:4, hold:7'",
            counts.len()
        ))
    })?;

    Ok(labels
        .iter()
        .zip(counts)
        .filter(|(_, secs)| *secs > 0)
        .map(|((key, label), secs)| PhaseDefinition::new(*key, *label, secs))
        .collect())
}

fn parse_named(input: &str) -> Result<Vec<PhaseDefinition>, BreatheError> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut phases = Vec::new();

    for item in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let caps = NAMED_PHASE_PATTERN.captures(item).ok_or_else(|| {
            BreatheError::InvalidInput(format!(
                "could not read phase '{item}'; expected 'name:seconds'"
            ))
        })?;

        let label = title_case(caps[1].trim());
        let secs: i64 = caps[2].parse().map_err(|e| {
            BreatheError::InvalidInput(format!("invalid duration in '{item}': {e}"))
        })?;

        let base = slugify(&label);
        let count = seen.entry(base.clone()).or_insert(0);
        *count += 1;
        let key = if *count == 1 {
            base
        } else {
            format!("{base}_{count}")
        };

        phases.push(PhaseDefinition::new(key, label, secs));
    }

    Ok(phases)
}

/// Build an exercise from a pattern string.
///
/// # Errors
///
/// Returns an error if the pattern cannot be parsed. Duration checks happen
/// when the exercise's sequence is built.
pub fn exercise_from_pattern(input: &str) -> Result<Exercise, BreatheError> {
    let phases = parse_pattern(input)?;
    let exercise = Exercise {
        slug: "custom".to_string(),
        name: format!("Custom ({})", input.trim()),
        description: "Ad-hoc pattern from the command line.".to_string(),
        aliases: vec![],
        phases,
        ambient_track: None,
    };
    Ok(exercise)
}

fn slugify(label: &str) -> String {
    label
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

fn title_case(label: &str) -> String {
    let mut chars = label.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}
