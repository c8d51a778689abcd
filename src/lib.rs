//! breathe - guided breathing exercises in the terminal
//!
//! The core is a timer-driven engine that walks a looping sequence of
//! breathing phases, notifying an observer on every phase change and
//! countdown tick. The CLI and TUI drive it against the wall clock and keep
//! a practice history in a local database.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod features;
pub mod logging;
pub mod output;
pub mod storage;
pub mod tui;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use core::{BreathCycleEngine, PhaseDefinition, PhaseSequence};
pub use error::{BreatheError, ConfigurationError};
