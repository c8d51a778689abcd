//! Breathing exercises.
//!
//! Every exercise is data: a phase list driven by the shared cycle engine.
//! - Built-in presets (Bhramari, Samavritti, 4-7-8, ...)
//! - User-defined exercises from the config file
//! - Ad-hoc patterns such as "4-7-8" from the command line

pub mod exercise;
pub mod pattern;
pub mod presets;

pub use exercise::Exercise;
pub use pattern::{exercise_from_pattern, parse_pattern};
pub use presets::{builtin_exercises, ExerciseCatalog};
