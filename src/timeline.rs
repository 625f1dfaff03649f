//! Logical-clock scheduler for deferred menu actions

use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

/// Monotonic time source driving a [`Timeline`]
pub trait Clock {
    /// Time elapsed since the clock started
    fn now(&self) -> Duration;
}

/// Real clock backed by [`Instant`]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

struct Slot<T> {
    due: Duration,
    seq: u64,
    cue: T,
}

impl<T> PartialEq for Slot<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Slot<T> {}

impl<T> PartialOrd for Slot<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so the max-heap pops the earliest slot; seq keeps FIFO order on ties.
impl<T> Ord for Slot<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Pending cues ordered by due time.
///
/// Cues are fire-once and never cancelled. Time only moves forward: popping a
/// cue sets the logical time to its due point, so cues scheduled while
/// handling it are relative to when it was meant to fire.
pub struct Timeline<T> {
    now: Duration,
    seq: u64,
    pending: BinaryHeap<Slot<T>>,
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            seq: 0,
            pending: BinaryHeap::new(),
        }
    }

    #[cfg(test)]
    fn now(&self) -> Duration {
        self.now
    }

    /// Number of pending cues
    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    /// Due time of the earliest pending cue
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.peek().map(|slot| slot.due)
    }

    /// Schedule `cue` at `delay` after the current logical time
    pub fn schedule_in(&mut self, delay: Duration, cue: T) {
        let due = self.now + delay;
        self.seq += 1;
        self.pending.push(Slot {
            due,
            seq: self.seq,
            cue,
        });
    }

    /// Pop the earliest cue due at or before `until`, moving logical time to it
    pub fn pop_due(&mut self, until: Duration) -> Option<T> {
        if self.pending.peek()?.due > until {
            return None;
        }
        let slot = self.pending.pop()?;
        self.now = self.now.max(slot.due);
        Some(slot.cue)
    }

    /// Move logical time forward without firing anything
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self::new()
    }
}
