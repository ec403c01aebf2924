use std::cell::Cell;

use chrono::Utc;

use super::Timestamp;

/// Source of the timestamps stamped onto nodes.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Reads the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from(Utc::now())
    }
}

/// Deterministic clock that advances by a fixed number of seconds on every
/// reading. Useful wherever output must not depend on the wall clock.
#[derive(Debug, Clone)]
pub struct SteppingClock {
    next: Cell<i64>,
    step: i64,
}

impl SteppingClock {
    /// Starts at `start` seconds since the Unix epoch.
    pub fn new(start: i64, step: i64) -> Self {
        Self {
            next: Cell::new(start),
            step,
        }
    }
}

impl Default for SteppingClock {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> Timestamp {
        let seconds = self.next.get();
        self.next.set(seconds.saturating_add(self.step));
        Timestamp::from_unix_seconds(seconds).unwrap_or_default()
    }
}
