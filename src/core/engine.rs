//! The breathing cycle engine.
//!
//! Runs an ordered, looping sequence of phases in real time. Each phase entry
//! arms two independent timers: a one-second countdown tick and a one-shot
//! advance timer due exactly `duration_seconds` after entry. Transitions are
//! governed by the advance deadline, never by counting ticks.
//!
//! Every armed timer carries the phase epoch it belongs to. Pausing, disposing
//! and entering a new phase all bump the epoch, so a fire that was already in
//! flight when its timer was cancelled is recognised as stale and dropped.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, trace, warn};

use super::phase::{PhaseDefinition, PhaseSequence};
use super::timer::{TimerFacility, TimerHandle, TimerQueue};
use super::traits::CycleObserver;
use crate::error::ConfigurationError;

/// Interval of the countdown tick.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Payload of the timers armed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleTimer {
    /// Countdown tick for the phase armed in `epoch`.
    Tick {
        /// Phase epoch at arming time.
        epoch: u64,
    },
    /// Phase-advance deadline for the phase armed in `epoch`.
    Advance {
        /// Phase epoch at arming time.
        epoch: u64,
    },
}

/// Observable engine state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineState {
    /// Whether the cycle is running.
    pub running: bool,
    /// Index of the current phase in the sequence.
    pub current_phase_index: usize,
    /// Seconds left in the current phase.
    pub remaining_seconds: i64,
    /// Whether background audio should play while running.
    pub sound_enabled: bool,
    /// Full cycles completed since the last start.
    pub cycles_completed: u64,
}

/// Drives a [`PhaseSequence`] through time.
pub struct BreathCycleEngine<O, T = TimerQueue<CycleTimer>> {
    sequence: PhaseSequence,
    observer: O,
    timers: T,
    state: EngineState,
    epoch: u64,
    tick: Option<TimerHandle>,
    advance: Option<TimerHandle>,
    phase_started_at: Duration,
    disposed: bool,
}

impl<O: CycleObserver> BreathCycleEngine<O> {
    /// Create a stopped engine backed by a fresh [`TimerQueue`].
    #[must_use]
    pub fn new(sequence: PhaseSequence, sound_enabled: bool, observer: O) -> Self {
        Self::with_timers(sequence, sound_enabled, observer, TimerQueue::new())
    }

    /// Validate `phases` and create a stopped engine.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if the phases do not form a valid
    /// sequence. No timer is created in that case.
    pub fn from_phases(
        phases: Vec<PhaseDefinition>,
        sound_enabled: bool,
        observer: O,
    ) -> Result<Self, ConfigurationError> {
        let sequence = PhaseSequence::new(phases)?;
        Ok(Self::new(sequence, sound_enabled, observer))
    }
}

impl<O: CycleObserver, T: TimerFacility<CycleTimer>> BreathCycleEngine<O, T> {
    /// Create a stopped engine on a caller-supplied timer facility.
    pub fn with_timers(sequence: PhaseSequence, sound_enabled: bool, observer: O, timers: T) -> Self {
        let state = EngineState {
            running: false,
            current_phase_index: 0,
            remaining_seconds: sequence.first().duration_seconds,
            sound_enabled,
            cycles_completed: 0,
        };

        Self {
            sequence,
            observer,
            phase_started_at: timers.now(),
            timers,
            state,
            epoch: 0,
            tick: None,
            advance: None,
            disposed: false,
        }
    }

    /// Start the cycle from the first phase.
    ///
    /// No-op if already running. Always begins at phase 0 with its full
    /// duration, never mid-cycle.
    pub fn start(&mut self) {
        if self.disposed {
            warn!("start called on a disposed engine");
            return;
        }
        if self.state.running {
            return;
        }

        self.reset_to_first_phase();
        self.state.cycles_completed = 0;
        self.state.running = true;
        debug!(phases = self.sequence.len(), "breath cycle started");

        let first = self.sequence.first();
        self.observer.on_phase_change(first);
        self.arm_phase();
    }

    /// Stop the cycle and return the display state to the first phase.
    ///
    /// No-op if not running.
    pub fn pause(&mut self) {
        if !self.state.running {
            return;
        }

        self.cancel_timers();
        self.state.running = false;
        self.reset_to_first_phase();
        debug!(
            cycles = self.state.cycles_completed,
            "breath cycle paused"
        );
    }

    /// Flip the sound flag and return the new value.
    ///
    /// Never starts or stops the cycle.
    pub fn toggle_sound(&mut self) -> bool {
        self.state.sound_enabled = !self.state.sound_enabled;
        debug!(sound_enabled = self.state.sound_enabled, "sound toggled");
        self.state.sound_enabled
    }

    /// Cancel all timers permanently. No callback fires after this returns.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.cancel_timers();
        self.state.running = false;
        self.disposed = true;
        debug!("breath cycle disposed");
    }

    /// Move the clock to `now`, delivering every timer due on the way.
    pub fn advance_to(&mut self, now: Duration) {
        while let Some(fired) = self.timers.next_due(now) {
            self.handle_timer(fired.payload);
        }
    }

    /// Move the clock forward by `delta`.
    pub fn advance_by(&mut self, delta: Duration) {
        let target = self.timers.now() + delta;
        self.advance_to(target);
    }

    fn handle_timer(&mut self, timer: CycleTimer) {
        if self.disposed || !self.state.running {
            trace!(?timer, "timer fired while stopped");
            return;
        }

        match timer {
            CycleTimer::Tick { epoch } if epoch == self.epoch => {
                self.state.remaining_seconds = (self.state.remaining_seconds - 1).max(0);
                trace!(remaining = self.state.remaining_seconds, "tick");
                self.observer.on_tick(self.state.remaining_seconds);
            }
            CycleTimer::Advance { epoch } if epoch == self.epoch => self.advance_phase(),
            stale => trace!(?stale, epoch = self.epoch, "stale timer ignored"),
        }
    }

    fn advance_phase(&mut self) {
        // The one-shot has already been consumed by the facility.
        self.advance = None;
        if let Some(tick) = self.tick.take() {
            self.timers.cancel(tick);
        }

        let next = self.sequence.next_index(self.state.current_phase_index);
        if next == 0 {
            self.state.cycles_completed += 1;
        }

        let phase = &self.sequence.as_slice()[next];
        self.state.current_phase_index = next;
        self.state.remaining_seconds = phase.duration_seconds;
        debug!(
            phase = %phase.key,
            index = next,
            cycles = self.state.cycles_completed,
            "phase advanced"
        );

        self.observer.on_phase_change(phase);
        self.arm_phase();
    }

    fn arm_phase(&mut self) {
        self.epoch += 1;
        let epoch = self.epoch;
        let duration = Duration::from_millis(self.current_phase().duration_millis());

        self.phase_started_at = self.timers.now();
        // Armed before the tick so the advance wins when both fall due together.
        self.advance = Some(
            self.timers
                .schedule_once(duration, CycleTimer::Advance { epoch }),
        );
        self.tick = Some(
            self.timers
                .schedule_repeating(TICK_INTERVAL, CycleTimer::Tick { epoch }),
        );
    }

    fn cancel_timers(&mut self) {
        self.epoch += 1;
        if let Some(tick) = self.tick.take() {
            self.timers.cancel(tick);
        }
        if let Some(advance) = self.advance.take() {
            self.timers.cancel(advance);
        }
    }

    fn reset_to_first_phase(&mut self) {
        self.state.current_phase_index = 0;
        self.state.remaining_seconds = self.sequence.first().duration_seconds;
        self.phase_started_at = self.timers.now();
    }

    /// Snapshot of the current state.
    #[must_use]
    pub const fn state(&self) -> &EngineState {
        &self.state
    }

    /// The configured sequence.
    #[must_use]
    pub const fn sequence(&self) -> &PhaseSequence {
        &self.sequence
    }

    /// The phase currently displayed.
    #[must_use]
    pub fn current_phase(&self) -> &PhaseDefinition {
        &self.sequence.as_slice()[self.state.current_phase_index]
    }

    /// Check if the cycle is running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.state.running
    }

    /// Check if the engine has been disposed.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Current sound flag.
    #[must_use]
    pub const fn sound_enabled(&self) -> bool {
        self.state.sound_enabled
    }

    /// Full cycles completed since the last start.
    #[must_use]
    pub const fn cycles_completed(&self) -> u64 {
        self.state.cycles_completed
    }

    /// Current position of the engine clock.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Deadline of the next pending timer, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Time spent in the current phase. Zero while stopped.
    pub fn phase_elapsed(&self) -> Duration {
        if self.state.running {
            self.timers.now().saturating_sub(self.phase_started_at)
        } else {
            Duration::ZERO
        }
    }

    /// Progress through the current phase (0.0 - 1.0).
    #[allow(clippy::cast_precision_loss)]
    pub fn phase_progress(&self) -> f64 {
        let total = self.current_phase().duration_millis() as f64;
        let elapsed = self.phase_elapsed().as_millis() as f64;
        (elapsed / total).min(1.0)
    }

    /// Borrow the observer.
    pub const fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutably borrow the observer, e.g. to drain recorded events.
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }
}

impl<O, T> std::fmt::Debug for BreathCycleEngine<O, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreathCycleEngine")
            .field("sequence", &self.sequence)
            .field("state", &self.state)
            .field("epoch", &self.epoch)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::{CycleEvent, EventLog, MockCycleObserver};

    fn phase(key: &str, secs: i64) -> PhaseDefinition {
        PhaseDefinition::new(key, key, secs)
    }

    fn engine(phases: Vec<PhaseDefinition>) -> BreathCycleEngine<EventLog> {
        BreathCycleEngine::from_phases(phases, true, EventLog::new()).unwrap()
    }

    fn changed(key: &str) -> CycleEvent {
        CycleEvent::PhaseChanged {
            key: key.to_string(),
            label: key.to_string(),
        }
    }

    fn tick(remaining_seconds: i64) -> CycleEvent {
        CycleEvent::Tick { remaining_seconds }
    }

    /// Advance one second at a time, returning the events seen at each second.
    fn timeline(
        engine: &mut BreathCycleEngine<EventLog>,
        seconds: u64,
    ) -> Vec<(u64, Vec<CycleEvent>)> {
        let mut out = vec![(0, engine.observer_mut().drain())];
        for t in 1..=seconds {
            engine.advance_to(Duration::from_secs(t));
            out.push((t, engine.observer_mut().drain()));
        }
        out
    }

    #[test]
    fn test_new_engine_is_stopped_at_first_phase() {
        let engine = engine(vec![phase("a", 4), phase("b", 8)]);
        let state = engine.state();

        assert!(!state.running);
        assert_eq!(state.current_phase_index, 0);
        assert_eq!(state.remaining_seconds, 4);
        assert!(state.sound_enabled);
        assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn test_deadline_governs_transitions() {
        let mut engine = engine(vec![phase("A", 4), phase("B", 8)]);
        engine.start();

        let seen = timeline(&mut engine, 12);

        assert_eq!(seen[0], (0, vec![changed("A")]));
        assert_eq!(seen[1], (1, vec![tick(3)]));
        assert_eq!(seen[2], (2, vec![tick(2)]));
        assert_eq!(seen[3], (3, vec![tick(1)]));
        // The advance wins the tie with the terminal tick.
        assert_eq!(seen[4], (4, vec![changed("B")]));
        for (t, remaining) in (5..=11).zip((1..=7).rev()) {
            assert_eq!(seen[t as usize], (t, vec![tick(remaining)]));
        }
        assert_eq!(seen[12], (12, vec![changed("A")]));
    }

    #[test]
    fn test_coarse_polling_delivers_same_sequence() {
        let mut engine = engine(vec![phase("A", 4), phase("B", 8)]);
        engine.start();
        engine.advance_to(Duration::from_secs(12));

        let events = engine.observer_mut().drain();
        let phase_changes: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, CycleEvent::PhaseChanged { .. }))
            .collect();
        assert_eq!(phase_changes.len(), 3);
        assert_eq!(events.len(), 3 + 3 + 7);
    }

    #[test]
    fn test_cycle_returns_to_first_phase() {
        let mut engine = engine(vec![phase("in", 4), phase("hold", 7), phase("out", 8)]);
        engine.start();

        let len = engine.sequence().len();
        let mut advances = 0;
        while advances < len {
            let deadline = engine.next_deadline().unwrap();
            let before = engine.state().current_phase_index;
            engine.advance_to(deadline);
            if engine.state().current_phase_index != before {
                advances += 1;
            }
        }

        assert_eq!(engine.state().current_phase_index, 0);
        assert_eq!(engine.cycles_completed(), 1);
        assert_eq!(engine.now(), Duration::from_secs(19));
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut engine = engine(vec![phase("a", 4)]);
        engine.start();
        engine.advance_to(Duration::from_secs(2));
        engine.start();

        assert_eq!(engine.state().remaining_seconds, 2);
        let changes = engine
            .observer()
            .events()
            .iter()
            .filter(|e| matches!(e, CycleEvent::PhaseChanged { .. }))
            .count();
        assert_eq!(changes, 1);
    }

    #[test]
    fn test_pause_resets_to_first_phase() {
        let mut engine = engine(vec![phase("a", 4), phase("b", 8)]);
        engine.start();
        engine.advance_to(Duration::from_secs(6));
        assert_eq!(engine.state().current_phase_index, 1);

        engine.pause();

        let state = engine.state();
        assert!(!state.running);
        assert_eq!(state.current_phase_index, 0);
        assert_eq!(state.remaining_seconds, 4);
        assert_eq!(engine.next_deadline(), None);
        assert_eq!(engine.phase_elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_pause_when_stopped_is_noop() {
        let mut engine = engine(vec![phase("a", 4)]);
        engine.pause();
        assert!(!engine.is_running());
        assert!(engine.observer().events().is_empty());
    }

    #[test]
    fn test_pause_then_start_matches_fresh_start() {
        let phases = vec![phase("A", 4), phase("B", 8)];

        let mut fresh = engine(phases.clone());
        fresh.advance_to(Duration::from_secs(5));
        fresh.start();
        fresh.advance_to(Duration::from_secs(30));

        let mut restarted = engine(phases);
        restarted.start();
        restarted.advance_to(Duration::from_millis(2500));
        restarted.pause();
        restarted.advance_to(Duration::from_secs(5));
        restarted.observer_mut().drain();
        restarted.start();
        restarted.advance_to(Duration::from_secs(30));

        assert_eq!(restarted.observer().events(), fresh.observer().events());
        assert_eq!(restarted.state(), fresh.state());
        assert_eq!(restarted.next_deadline(), fresh.next_deadline());
    }

    #[test]
    fn test_dispose_stops_all_callbacks() {
        let mut engine = engine(vec![phase("a", 2), phase("b", 3)]);
        engine.start();
        engine.advance_to(Duration::from_secs(3));
        engine.dispose();
        engine.observer_mut().drain();

        engine.advance_to(Duration::from_secs(3600));
        engine.start();
        engine.advance_to(Duration::from_secs(7200));

        assert!(engine.observer().events().is_empty());
        assert!(engine.is_disposed());
        assert!(!engine.is_running());
        assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn test_dispose_with_mock_observer() {
        let mut observer = MockCycleObserver::new();
        observer
            .expect_on_phase_change()
            .withf(|p| p.key == "a")
            .times(1)
            .return_const(());
        observer.expect_on_tick().times(1).return_const(());

        let seq = PhaseSequence::new(vec![phase("a", 5)]).unwrap();
        let mut engine = BreathCycleEngine::new(seq, false, observer);
        engine.start();
        engine.advance_to(Duration::from_secs(1));
        engine.dispose();
        engine.advance_to(Duration::from_secs(100));
    }

    #[test]
    fn test_stale_fire_is_ignored() {
        let mut engine = engine(vec![phase("a", 4), phase("b", 4)]);
        engine.start();
        engine.observer_mut().drain();

        // A fire queued by the host just before cancellation took effect.
        let stale_epoch = engine.epoch;
        engine.pause();
        engine.start();
        engine.observer_mut().drain();

        engine.handle_timer(CycleTimer::Tick { epoch: stale_epoch });
        engine.handle_timer(CycleTimer::Advance { epoch: stale_epoch });

        assert!(engine.observer().events().is_empty());
        assert_eq!(engine.state().current_phase_index, 0);
        assert_eq!(engine.state().remaining_seconds, 4);
    }

    #[test]
    fn test_fire_after_pause_is_ignored() {
        let mut engine = engine(vec![phase("a", 4)]);
        engine.start();
        let epoch = engine.epoch;
        engine.pause();
        engine.observer_mut().drain();

        engine.handle_timer(CycleTimer::Advance { epoch });
        assert!(engine.observer().events().is_empty());
        assert!(!engine.is_running());
    }

    #[test]
    fn test_toggle_sound_while_stopped() {
        let mut engine = engine(vec![phase("a", 4)]);
        assert!(!engine.toggle_sound());
        assert!(engine.toggle_sound());
        assert!(!engine.is_running());
        assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn test_toggle_sound_while_running_keeps_timing() {
        let mut engine = engine(vec![phase("a", 4)]);
        engine.start();
        engine.advance_to(Duration::from_secs(1));
        engine.toggle_sound();

        assert!(engine.is_running());
        assert!(!engine.sound_enabled());
        assert_eq!(engine.next_deadline(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        let empty = BreathCycleEngine::from_phases(vec![], true, EventLog::new());
        assert_eq!(empty.unwrap_err(), ConfigurationError::EmptySequence);

        let zero = BreathCycleEngine::from_phases(vec![phase("a", 0)], true, EventLog::new());
        assert!(matches!(
            zero.unwrap_err(),
            ConfigurationError::NonPositiveDuration { .. }
        ));

        let negative =
            BreathCycleEngine::from_phases(vec![phase("a", 4), phase("b", -1)], true, EventLog::new());
        assert!(negative.is_err());
    }

    #[test]
    fn test_invalid_configuration_schedules_nothing() {
        let mut queue = TimerQueue::new();
        let rejected = PhaseSequence::new(vec![phase("a", 4), phase("b", 0)])
            .map(|seq| BreathCycleEngine::with_timers(seq, true, EventLog::new(), &mut queue))
            .is_err();

        assert!(rejected);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_borrowed_timer_queue_drives_engine() {
        let mut queue = TimerQueue::new();
        {
            let seq = PhaseSequence::new(vec![phase("a", 3)]).unwrap();
            let mut engine = BreathCycleEngine::with_timers(seq, true, EventLog::new(), &mut queue);
            engine.start();
            engine.advance_to(Duration::from_secs(1));
            assert_eq!(engine.state().remaining_seconds, 2);
        }
        // Advance and tick are still armed in the shared queue.
        assert_eq!(queue.pending(), 2);
    }

    #[test]
    fn test_one_second_phases() {
        let mut engine = engine(vec![phase("a", 1), phase("b", 1)]);
        engine.start();
        engine.advance_to(Duration::from_secs(4));

        let events = engine.observer_mut().drain();
        assert_eq!(
            events,
            vec![changed("a"), changed("b"), changed("a"), changed("b"), changed("a")]
        );
        assert_eq!(engine.cycles_completed(), 2);
    }

    #[test]
    fn test_phase_progress() {
        let mut engine = engine(vec![phase("a", 4)]);
        engine.start();
        engine.advance_to(Duration::from_secs(2));
        assert!((engine.phase_progress() - 0.5).abs() < f64::EPSILON);
        assert_eq!(engine.current_phase().key, "a");
    }

    #[test]
    fn test_start_resets_cycle_count() {
        let mut engine = engine(vec![phase("a", 1)]);
        engine.start();
        engine.advance_to(Duration::from_secs(3));
        assert_eq!(engine.cycles_completed(), 3);

        engine.pause();
        assert_eq!(engine.cycles_completed(), 3);
        engine.start();
        assert_eq!(engine.cycles_completed(), 0);
    }
}
