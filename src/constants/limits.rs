use std::time::Duration;

/// Flood protection thresholds (defaults, can be overridden via env vars)
pub const DEFAULT_MESSAGES_PER_MINUTE: u32 = 20;  // Messages allowed inside one window
pub const DEFAULT_MAX_SIMILAR_MESSAGES: u32 = 5;  // Identical messages in a row before spam
pub const DEFAULT_BLOCK_MINUTES: u64 = 5;         // How long a triggered block lasts

/// Largest block length whose idle default still fits in seconds
pub const MAX_BLOCK_MINUTES: u64 = u64::MAX / 120;

/// Rolling window for the message counter (1 minute)
pub const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Idle sweep is off unless an interval is configured
pub const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 0;

/// Get the default idle threshold for a given block duration
pub fn default_idle_seconds(block_minutes: u64) -> u64 {
    block_minutes
        .saturating_mul(120)
        .max(RATE_WINDOW.as_secs())
}
