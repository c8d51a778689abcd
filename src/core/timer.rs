//! Timer facility for the breathing engine.
//!
//! Timers carry a typed payload instead of a closure. When a timer falls due
//! the facility hands the payload back to its owner, which then reacts with
//! full `&mut` access to its own state. Time is virtual: the owner moves the
//! clock forward with [`TimerFacility::next_due`], either from simulated time
//! in tests or from a monotonic wall clock in the runner and TUI.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Opaque handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// A timer that fell due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<E> {
    /// Handle of the timer that fired.
    pub handle: TimerHandle,
    /// Deadline the timer was scheduled for.
    pub at: Duration,
    /// Payload supplied when the timer was scheduled.
    pub payload: E,
}

/// Host timer facility.
///
/// Cancellation is synchronous: once `cancel` returns, `next_due` never yields
/// that handle again.
pub trait TimerFacility<E> {
    /// Current position of the facility's clock.
    fn now(&self) -> Duration;

    /// Schedule `payload` to fire every `interval`, first at `now + interval`.
    fn schedule_repeating(&mut self, interval: Duration, payload: E) -> TimerHandle;

    /// Schedule `payload` to fire once at `now + delay`.
    fn schedule_once(&mut self, delay: Duration, payload: E) -> TimerHandle;

    /// Cancel a timer. Unknown or already-fired handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);

    /// Deadline of the earliest pending timer.
    fn next_deadline(&self) -> Option<Duration>;

    /// Pop the earliest timer due at or before `until`.
    ///
    /// The clock moves to the fired timer's deadline, or to `until` when
    /// nothing is due. Repeating timers are re-armed relative to their own
    /// deadline so late polling never accumulates drift.
    fn next_due(&mut self, until: Duration) -> Option<Fired<E>>;
}

impl<E, T: TimerFacility<E> + ?Sized> TimerFacility<E> for &mut T {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn schedule_repeating(&mut self, interval: Duration, payload: E) -> TimerHandle {
        (**self).schedule_repeating(interval, payload)
    }

    fn schedule_once(&mut self, delay: Duration, payload: E) -> TimerHandle {
        (**self).schedule_once(delay, payload)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        (**self).cancel(handle);
    }

    fn next_deadline(&self) -> Option<Duration> {
        (**self).next_deadline()
    }

    fn next_due(&mut self, until: Duration) -> Option<Fired<E>> {
        (**self).next_due(until)
    }
}

#[derive(Debug)]
struct Entry<E> {
    payload: E,
    interval: Option<Duration>,
    slot: (Duration, u64),
}

/// Deterministic virtual-time timer queue.
///
/// Timers are ordered by deadline, then by the order in which they were
/// armed, so two timers due at the same instant fire in scheduling order.
#[derive(Debug)]
pub struct TimerQueue<E> {
    now: Duration,
    next_id: u64,
    next_seq: u64,
    queue: BTreeMap<(Duration, u64), TimerHandle>,
    entries: HashMap<TimerHandle, Entry<E>>,
}

impl<E> TimerQueue<E> {
    /// Create an empty queue with its clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            next_seq: 0,
            queue: BTreeMap::new(),
            entries: HashMap::new(),
        }
    }

    /// Number of pending timers.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Check whether a timer is still pending.
    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    fn slot_at(&mut self, deadline: Duration) -> (Duration, u64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        (deadline, seq)
    }

    fn insert(&mut self, delay: Duration, interval: Option<Duration>, payload: E) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;

        let slot = self.slot_at(self.now + delay);
        self.queue.insert(slot, handle);
        self.entries.insert(
            handle,
            Entry {
                payload,
                interval,
                slot,
            },
        );
        handle
    }
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone> TimerFacility<E> for TimerQueue<E> {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule_repeating(&mut self, interval: Duration, payload: E) -> TimerHandle {
        // A zero interval would fire forever at a single instant.
        let interval = interval.max(Duration::from_millis(1));
        self.insert(interval, Some(interval), payload)
    }

    fn schedule_once(&mut self, delay: Duration, payload: E) -> TimerHandle {
        self.insert(delay, None, payload)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(entry) = self.entries.remove(&handle) {
            self.queue.remove(&entry.slot);
        }
    }

    fn next_deadline(&self) -> Option<Duration> {
        self.queue.first_key_value().map(|((deadline, _), _)| *deadline)
    }

    fn next_due(&mut self, until: Duration) -> Option<Fired<E>> {
        let due = self
            .queue
            .first_key_value()
            .is_some_and(|((deadline, _), _)| *deadline <= until);

        if !due {
            self.now = self.now.max(until);
            return None;
        }

        let ((deadline, _), handle) = self.queue.pop_first()?;
        self.now = self.now.max(deadline);

        let interval = self.entries.get(&handle)?.interval;
        let payload = match interval {
            Some(interval) => {
                let slot = self.slot_at(deadline + interval);
                self.queue.insert(slot, handle);
                let entry = self.entries.get_mut(&handle)?;
                entry.slot = slot;
                entry.payload.clone()
            }
            None => self.entries.remove(&handle)?.payload,
        };

        Some(Fired {
            handle,
            at: deadline,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn drain(queue: &mut TimerQueue<&'static str>, until: Duration) -> Vec<(u64, &'static str)> {
        let mut fired = Vec::new();
        while let Some(f) = queue.next_due(until) {
            fired.push((f.at.as_secs(), f.payload));
        }
        fired
    }

    #[test]
    fn test_once_fires_at_deadline() {
        let mut queue = TimerQueue::new();
        queue.schedule_once(secs(3), "once");

        assert!(drain(&mut queue, secs(2)).is_empty());
        assert_eq!(queue.now(), secs(2));

        assert_eq!(drain(&mut queue, secs(3)), vec![(3, "once")]);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_repeating_rearms_without_drift() {
        let mut queue = TimerQueue::new();
        queue.schedule_repeating(secs(1), "tick");

        // Polling late still yields every whole second.
        assert_eq!(
            drain(&mut queue, Duration::from_millis(3500)),
            vec![(1, "tick"), (2, "tick"), (3, "tick")]
        );
        assert_eq!(queue.next_deadline(), Some(secs(4)));
    }

    #[test]
    fn test_ties_fire_in_scheduling_order() {
        let mut queue = TimerQueue::new();
        queue.schedule_once(secs(2), "first");
        queue.schedule_repeating(secs(1), "tick");

        let fired = drain(&mut queue, secs(2));
        assert_eq!(fired, vec![(1, "tick"), (2, "first"), (2, "tick")]);
    }

    #[test]
    fn test_cancel_is_synchronous() {
        let mut queue = TimerQueue::new();
        let tick = queue.schedule_repeating(secs(1), "tick");
        let once = queue.schedule_once(secs(2), "once");

        queue.cancel(tick);
        assert!(!queue.is_pending(tick));
        assert!(queue.is_pending(once));

        assert_eq!(drain(&mut queue, secs(10)), vec![(2, "once")]);
    }

    #[test]
    fn test_cancel_unknown_handle() {
        let mut queue: TimerQueue<&str> = TimerQueue::new();
        let handle = queue.schedule_once(secs(1), "x");
        queue.cancel(handle);
        queue.cancel(handle);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_schedule_is_relative_to_clock() {
        let mut queue = TimerQueue::new();
        assert!(queue.next_due(secs(5)).is_none());

        queue.schedule_once(secs(2), "late");
        assert_eq!(queue.next_deadline(), Some(secs(7)));
    }

    #[test]
    fn test_clock_never_moves_backwards() {
        let mut queue: TimerQueue<&str> = TimerQueue::new();
        assert!(queue.next_due(secs(5)).is_none());
        assert!(queue.next_due(secs(1)).is_none());
        assert_eq!(queue.now(), secs(5));
    }

    #[test]
    fn test_mut_ref_is_a_facility() {
        fn arm<T: TimerFacility<&'static str>>(mut timers: T) {
            timers.schedule_once(secs(1), "via ref");
        }

        let mut queue = TimerQueue::new();
        arm(&mut queue);
        assert_eq!(queue.pending(), 1);
    }
}
