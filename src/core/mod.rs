//! Core breathing engine.
//!
//! Phase sequences, the timer facility, the cycle engine, and the collaborator
//! traits the presentation layer implements.

pub mod audio;
pub mod engine;
pub mod phase;
pub mod timer;
pub mod traits;

pub use audio::{AudioSync, LoggingPlayer};
pub use engine::{BreathCycleEngine, CycleTimer, EngineState, TICK_INTERVAL};
pub use phase::{cycle_seconds, PhaseDefinition, PhaseSequence, MAX_PHASE_SECONDS};
pub use timer::{Fired, TimerFacility, TimerHandle, TimerQueue};
pub use traits::{AudioPlayer, CycleEvent, CycleObserver, EventLog};
