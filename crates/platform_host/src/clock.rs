//! Clock sources for the session chrome tick.

use std::{cell::Cell, rc::Rc};

use crate::time::unix_time_ms_now;

/// Source of unix millisecond timestamps for the session clock.
pub trait SessionClock {
    /// Returns the current unix time in milliseconds.
    fn now_ms(&self) -> u64;
}

/// Wall clock backed by `Date.now()` in the browser and `SystemTime` elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SessionClock for SystemClock {
    fn now_ms(&self) -> u64 {
        unix_time_ms_now()
    }
}

/// Manually advanced clock for tests and headless hosts.
///
/// Clones share the same underlying time.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now_ms: Rc<Cell<u64>>,
}

impl ManualClock {
    /// Creates a clock frozen at `now_ms`.
    pub fn at(now_ms: u64) -> Self {
        Self {
            now_ms: Rc::new(Cell::new(now_ms)),
        }
    }

    /// Moves the clock forward by `delta_ms`.
    pub fn advance(&self, delta_ms: u64) {
        self.now_ms.set(self.now_ms.get().saturating_add(delta_ms));
    }

    /// Sets the clock to an absolute time.
    pub fn set(&self, now_ms: u64) {
        self.now_ms.set(now_ms);
    }
}

impl SessionClock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::at(5_000);
        let shared = clock.clone();

        clock.advance(1_500);
        assert_eq!(shared.now_ms(), 6_500);

        shared.set(42);
        assert_eq!(clock.now_ms(), 42);
    }
}
