use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::mapref::one::RefMut;
use dashmap::DashMap;
use tracing::debug;

use crate::constants::limits::{
    DEFAULT_BLOCK_MINUTES, DEFAULT_MAX_SIMILAR_MESSAGES, DEFAULT_MESSAGES_PER_MINUTE, RATE_WINDOW,
};
use crate::services::spam::clock::{Clock, SystemClock};
use crate::services::spam::decision::{Decision, Rejection};
use crate::services::spam::timeout_calculator;

/// Limits applied to every user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Messages allowed inside one rolling window before blocking
    pub messages_per_minute: u32,
    /// Identical messages in a row allowed before blocking
    pub max_similar_messages: u32,
    pub block_duration: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            messages_per_minute: DEFAULT_MESSAGES_PER_MINUTE,
            max_similar_messages: DEFAULT_MAX_SIMILAR_MESSAGES,
            block_duration: Duration::from_secs(DEFAULT_BLOCK_MINUTES * 60),
        }
    }
}

/// Message rate and block state of one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserActivity {
    /// Messages counted in the current window
    pub message_count: u32,
    /// Last message that was let through, `None` before the first one
    pub last_message_time: Option<Instant>,
    pub is_blocked: bool,
    pub block_until: DateTime<Utc>,
}

impl Default for UserActivity {
    fn default() -> Self {
        Self {
            message_count: 0,
            last_message_time: None,
            is_blocked: false,
            block_until: DateTime::<Utc>::MIN_UTC,
        }
    }
}

/// Most recent text of one user and how many times in a row it was sent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastMessageRecord {
    pub text: String,
    pub repeat_count: u32,
}

/// Per-user flood and repeated-message guard.
///
/// Every inbound message goes through [`RateLimiter::evaluate`] before any
/// handler runs. Three checks run in a fixed order:
///
/// 1. an active block rejects outright and touches no counters,
/// 2. the rolling one-minute message counter,
/// 3. the identical-message counter.
///
/// Tripping either counter blocks the user for the configured duration. An
/// expired block is cleared lazily by the first message that arrives after
/// it, and that message is then checked like any other.
///
/// State lives in two concurrent maps keyed by user id. Messages from
/// different users may be evaluated in parallel; messages from one user are
/// expected to arrive one at a time.
pub struct RateLimiter<C: Clock = SystemClock> {
    config: RateLimitConfig,
    clock: C,
    /// user_id -> rate window and block state
    activity: DashMap<u64, UserActivity>,
    /// user_id -> last text and its repeat count
    last_messages: DashMap<u64, LastMessageRecord>,
}

impl RateLimiter<SystemClock> {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> RateLimiter<C> {
    pub fn with_clock(config: RateLimitConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            activity: DashMap::new(),
            last_messages: DashMap::new(),
        }
    }

    /// Decide whether a message from `user_id` may be processed
    pub fn evaluate(&self, user_id: u64, text: &str) -> Decision {
        let now = self.clock.now();
        let wall_now = self.clock.wall_now();

        // Lock order: activity first, then last_messages
        let mut activity = self.activity_entry(user_id);

        if activity.is_blocked {
            if wall_now < activity.block_until {
                let remaining_secs =
                    timeout_calculator::remaining_seconds(activity.block_until, wall_now);
                return Decision::Rejected(Rejection::Blocked { remaining_secs });
            }

            activity.is_blocked = false;
            debug!("Block expired for user {}", user_id);
        }

        let in_window = activity
            .last_message_time
            .is_some_and(|last| now.saturating_duration_since(last) < RATE_WINDOW);

        if in_window {
            activity.message_count = activity.message_count.saturating_add(1);
            if activity.message_count > self.config.messages_per_minute {
                self.block(user_id, &mut activity, wall_now);
                return Decision::Rejected(Rejection::TooManyMessages {
                    block_minutes: self.block_minutes(),
                });
            }
        } else {
            activity.message_count = 1;
        }

        {
            let mut last = self.last_message_entry(user_id);
            if last.text == text {
                last.repeat_count = last.repeat_count.saturating_add(1);
                if last.repeat_count > self.config.max_similar_messages {
                    self.block(user_id, &mut activity, wall_now);
                    return Decision::Rejected(Rejection::RepeatedMessages {
                        block_minutes: self.block_minutes(),
                    });
                }
            } else {
                last.text = text.to_owned();
                last.repeat_count = 1;
            }
        }

        activity.last_message_time = Some(now);
        Decision::Allowed
    }

    /// Forget everything about a user; the next message is treated as their first
    pub fn reset(&self, user_id: u64) {
        // Holding the activity entry keeps evaluate out until both records are gone
        let entry = self.activity.entry(user_id);
        self.last_messages.remove(&user_id);
        if let Entry::Occupied(occupied) = entry {
            occupied.remove();
        }
    }

    /// Drop users that are not blocked and have been quiet for `max_idle`.
    /// Returns how many users were removed.
    pub fn sweep_idle(&self, max_idle: Duration) -> usize {
        let now = self.clock.now();
        let wall_now = self.clock.wall_now();
        let mut swept = 0;

        // Text records go while the activity shard is still locked
        self.activity.retain(|user_id, activity| {
            let block_active = activity.is_blocked && wall_now < activity.block_until;
            let idle = activity
                .last_message_time
                .map_or(true, |last| now.saturating_duration_since(last) >= max_idle);

            if !block_active && idle {
                self.last_messages.remove(user_id);
                swept += 1;
                false
            } else {
                true
            }
        });

        swept
    }

    /// Number of users with recorded activity
    pub fn tracked_users(&self) -> usize {
        self.activity.len()
    }

    fn activity_entry(&self, user_id: u64) -> RefMut<'_, u64, UserActivity> {
        self.activity.entry(user_id).or_insert_with(UserActivity::default)
    }

    fn last_message_entry(&self, user_id: u64) -> RefMut<'_, u64, LastMessageRecord> {
        self.last_messages
            .entry(user_id)
            .or_insert_with(LastMessageRecord::default)
    }

    fn block(&self, user_id: u64, activity: &mut UserActivity, wall_now: DateTime<Utc>) {
        activity.is_blocked = true;
        activity.block_until = timeout_calculator::block_deadline(wall_now, self.config.block_duration);
        debug!("User {} blocked until {}", user_id, activity.block_until);
    }

    fn block_minutes(&self) -> u64 {
        timeout_calculator::block_minutes(self.config.block_duration)
    }
}

impl Default for RateLimiter<SystemClock> {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

impl<C: Clock> fmt::Debug for RateLimiter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("tracked_users", &self.activity.len())
            .field("tracked_texts", &self.last_messages.len())
            .finish_non_exhaustive()
    }
}
