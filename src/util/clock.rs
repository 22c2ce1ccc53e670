//! Wall-clock helpers. Every persisted timestamp in this crate is
//! milliseconds since the Unix epoch.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time in milliseconds since epoch.
#[must_use]
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Absolute due time for something that should happen `delay_ms` from `now`.
#[must_use]
pub const fn due_at(now: u64, delay_ms: u64) -> u64 {
    now.saturating_add(delay_ms)
}
