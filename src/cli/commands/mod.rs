//! Command implementations for breathe.

mod completions;
mod config;
mod exercises;
mod history;
mod run;

pub use completions::completions;
pub use config::config;
pub use exercises::{list, show};
pub use history::history;
pub use run::{run, TerminalObserver};

use crate::config::Config;
use crate::features::exercises::ExerciseCatalog;

/// Built-in exercises plus those defined in `config`.
#[must_use]
pub fn catalog(config: &Config) -> ExerciseCatalog {
    ExerciseCatalog::with_custom(&config.exercises)
}
