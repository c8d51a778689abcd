//! Collaborator traits for the breathing engine.
//!
//! The engine reports progress through a [`CycleObserver`]. Audio is owned by
//! the presentation layer through an [`AudioPlayer`]; the engine never touches
//! it directly.

use serde::Serialize;

use super::phase::PhaseDefinition;

/// Receives engine notifications.
#[cfg_attr(test, mockall::automock)]
pub trait CycleObserver {
    /// A new phase was entered (including the first phase on start).
    fn on_phase_change(&mut self, phase: &PhaseDefinition);

    /// The countdown for the current phase moved.
    fn on_tick(&mut self, remaining_seconds: i64);
}

/// Looping background audio owned by the presentation layer.
#[cfg_attr(test, mockall::automock)]
pub trait AudioPlayer {
    /// Start or resume playback.
    fn play(&mut self);

    /// Pause playback, keeping the position.
    fn pause(&mut self);

    /// Stop playback and release the track.
    fn stop(&mut self);

    /// Enable or disable looping.
    fn set_looping(&mut self, looping: bool);
}

/// A single engine notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CycleEvent {
    /// A phase was entered.
    PhaseChanged {
        /// Phase key.
        key: String,
        /// Phase label.
        label: String,
    },
    /// Countdown update.
    Tick {
        /// Seconds left in the phase.
        remaining_seconds: i64,
    },
}

/// Observer that records every notification for later draining.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<CycleEvent>,
}

impl EventLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[CycleEvent] {
        &self.events
    }

    /// Take all recorded events, leaving the log empty.
    pub fn drain(&mut self) -> Vec<CycleEvent> {
        std::mem::take(&mut self.events)
    }
}

impl CycleObserver for EventLog {
    fn on_phase_change(&mut self, phase: &PhaseDefinition) {
        self.events.push(CycleEvent::PhaseChanged {
            key: phase.key.clone(),
            label: phase.label.clone(),
        });
    }

    fn on_tick(&mut self, remaining_seconds: i64) {
        self.events.push(CycleEvent::Tick { remaining_seconds });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_records_in_order() {
        let mut log = EventLog::new();
        log.on_phase_change(&PhaseDefinition::new("in", "Inhale", 4));
        log.on_tick(3);

        assert_eq!(
            log.events(),
            &[
                CycleEvent::PhaseChanged {
                    key: "in".to_string(),
                    label: "Inhale".to_string()
                },
                CycleEvent::Tick {
                    remaining_seconds: 3
                },
            ]
        );
    }

    #[test]
    fn test_event_log_drain() {
        let mut log = EventLog::new();
        log.on_tick(1);
        assert_eq!(log.drain().len(), 1);
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_cycle_event_json() {
        let json = serde_json::to_string(&CycleEvent::Tick {
            remaining_seconds: 2,
        })
        .unwrap();
        assert_eq!(json, r#"{"event":"tick","remaining_seconds":2}"#);
    }
}
