use std::time::Duration;

/// Input poll interval in milliseconds
pub const DEFAULT_TICK_MS: u64 = 250;

/// Stopwatch display period in seconds
pub const STOPWATCH_PERIOD_SECS: i64 = 1;

/// How long the event loop waits for input before polling timers
pub fn tick_duration() -> Duration {
    Duration::from_millis(DEFAULT_TICK_MS)
}

/// Interval between live duration updates of the running timer
pub fn stopwatch_period() -> chrono::Duration {
    chrono::Duration::seconds(STOPWATCH_PERIOD_SECS)
}
