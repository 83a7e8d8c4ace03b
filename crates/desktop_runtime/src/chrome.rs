//! Session chrome flags: dock visibility, dark mode, lock state, and the clock tick.
//!
//! None of these interact with the window collection.

use platform_host::truncate_to_second;

/// Interval between clock ticks driven by the host.
pub const CLOCK_TICK_INTERVAL_MS: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionChrome {
    pub is_dock_visible: bool,
    pub is_dark_mode: bool,
    pub is_locked: bool,
    /// Last observed unix time, truncated to whole seconds.
    pub clock_ms: u64,
}

impl SessionChrome {
    pub fn new(dark_mode: bool) -> Self {
        Self {
            is_dock_visible: true,
            is_dark_mode: dark_mode,
            is_locked: false,
            clock_ms: 0,
        }
    }

    /// Records a clock tick. Returns `true` when the displayed second changed.
    pub fn apply_tick(&mut self, now_ms: u64) -> bool {
        let second = truncate_to_second(now_ms);
        if second == self.clock_ms {
            return false;
        }
        self.clock_ms = second;
        true
    }
}

impl Default for SessionChrome {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_within_the_same_second_are_ignored() {
        let mut chrome = SessionChrome::default();

        assert!(chrome.apply_tick(10_250));
        assert!(!chrome.apply_tick(10_999));
        assert!(chrome.apply_tick(11_000));
        assert_eq!(chrome.clock_ms, 11_000);
    }
}
