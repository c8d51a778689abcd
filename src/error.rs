//! Error types for breathe.

use thiserror::Error;

/// Rejected breathing configuration.
///
/// Raised synchronously when a phase sequence is built. An engine is never
/// constructed from a configuration that fails these checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The sequence has no phases.
    #[error("phase sequence must contain at least one phase")]
    EmptySequence,

    /// A phase has a zero or negative duration.
    #[error("phase '{key}' has non-positive duration {duration_seconds}s")]
    NonPositiveDuration {
        /// Key of the offending phase.
        key: String,
        /// The duration that was supplied.
        duration_seconds: i64,
    },

    /// A phase is longer than the supported maximum.
    #[error(
        "phase '{key}' duration {duration_seconds}s exceeds the {max}s limit",
        max = crate::core::MAX_PHASE_SECONDS
    )]
    DurationTooLong {
        /// Key of the offending phase.
        key: String,
        /// The duration that was supplied.
        duration_seconds: i64,
    },

    /// Two phases share the same key.
    #[error("duplicate phase key '{0}'")]
    DuplicateKey(String),
}

/// Main error type for breathe.
#[derive(Debug, Error)]
pub enum BreatheError {
    /// Invalid phase configuration.
    #[error("invalid exercise: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Configuration file or settings problem.
    #[error("config error: {0}")]
    Config(String),

    /// Database failure.
    #[error("database error: {0}")]
    Database(String),

    /// A requested item does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// User input could not be understood.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Serialization failure.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Terminal setup or drawing failure.
    #[error("terminal error: {0}")]
    Terminal(String),

    /// I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
