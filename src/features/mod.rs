//! Feature modules for breathe.
//!
//! - Exercises: built-in presets, config-defined exercises and ad-hoc patterns
//! - Practice: session history backed by the local database

pub mod exercises;
pub mod practice;
