use std::fmt;

use crate::config::Settings;
use crate::services::spam::clock::{Clock, SystemClock};
use crate::services::spam::rate_limiter::RateLimiter;

/// Shared data available to all handlers
pub struct Data<C: Clock = SystemClock> {
    pub settings: Settings,
    /// Flood and repeat guard, consulted before every handler
    pub rate_limiter: RateLimiter<C>,
}

impl Data<SystemClock> {
    pub fn new(settings: Settings) -> Self {
        let rate_limiter = RateLimiter::new(settings.rate_limit_config());
        Self {
            settings,
            rate_limiter,
        }
    }
}

impl<C: Clock> Data<C> {
    pub fn with_clock(settings: Settings, clock: C) -> Self {
        let rate_limiter = RateLimiter::with_clock(settings.rate_limit_config(), clock);
        Self {
            settings,
            rate_limiter,
        }
    }
}

impl<C: Clock> fmt::Debug for Data<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data")
            .field("admin_count", &self.settings.admin_ids.len())
            .field("tracked_users", &self.rate_limiter.tracked_users())
            .finish_non_exhaustive()
    }
}
