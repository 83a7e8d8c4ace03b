//! Time helpers shared across host contracts and adapters.

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current unix timestamp in milliseconds.
pub fn unix_time_ms_now() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now().max(0.0) as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Drops the sub-second part of a unix millisecond timestamp.
pub fn truncate_to_second(timestamp_ms: u64) -> u64 {
    timestamp_ms - timestamp_ms % 1_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_keeps_whole_seconds() {
        assert_eq!(truncate_to_second(1_700_000_000_999), 1_700_000_000_000);
        assert_eq!(truncate_to_second(1_000), 1_000);
        assert_eq!(truncate_to_second(999), 0);
    }

    #[test]
    fn system_time_is_after_2020() {
        assert!(unix_time_ms_now() > 1_577_836_800_000);
    }
}
