use std::time::Duration;

use chrono::{DateTime, Utc};

/// Whole minutes of a block duration, as shown to the user
pub fn block_minutes(duration: Duration) -> u64 {
    duration.as_secs() / 60
}

/// Wall-clock moment a block started at `now` ends
pub fn block_deadline(now: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(duration)
        .ok()
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Whole seconds left until `until`, rounded down
pub fn remaining_seconds(until: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (until - now).num_seconds().max(0) as u64
}
