use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::bot::error::Error;
use crate::constants::limits::{
    default_idle_seconds, DEFAULT_BLOCK_MINUTES, DEFAULT_MAX_SIMILAR_MESSAGES,
    DEFAULT_MESSAGES_PER_MINUTE, DEFAULT_SWEEP_INTERVAL_SECONDS, MAX_BLOCK_MINUTES, RATE_WINDOW,
};
use crate::services::spam::rate_limiter::RateLimitConfig;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Flood protection: messages allowed per rolling minute
    pub messages_per_minute: u32,
    /// Flood protection: identical messages in a row before blocking
    pub max_similar_messages: u32,
    /// Flood protection: block length in minutes
    pub block_minutes: u64,
    /// Idle sweep interval in seconds, 0 disables the sweeper
    pub sweep_interval_seconds: u64,
    /// Idle time after which an unblocked user's records are dropped
    pub idle_seconds: u64,
    /// Users allowed to lift blocks
    pub admin_ids: Vec<u64>,
}

impl Settings {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (env vars in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let messages_per_minute = parse_or(
            &lookup,
            "RATE_LIMIT_MESSAGES_PER_MINUTE",
            DEFAULT_MESSAGES_PER_MINUTE,
        )?;

        let max_similar_messages = parse_or(
            &lookup,
            "RATE_LIMIT_MAX_SIMILAR_MESSAGES",
            DEFAULT_MAX_SIMILAR_MESSAGES,
        )?;

        let block_minutes = parse_or(&lookup, "RATE_LIMIT_BLOCK_MINUTES", DEFAULT_BLOCK_MINUTES)?;
        if block_minutes > MAX_BLOCK_MINUTES {
            return Err(Error::invalid_config(
                "RATE_LIMIT_BLOCK_MINUTES",
                block_minutes.to_string(),
            ));
        }

        let sweep_interval_seconds = parse_or(
            &lookup,
            "RATE_LIMIT_SWEEP_INTERVAL_SECONDS",
            DEFAULT_SWEEP_INTERVAL_SECONDS,
        )?;

        let idle_seconds = parse_or(
            &lookup,
            "RATE_LIMIT_IDLE_SECONDS",
            default_idle_seconds(block_minutes),
        )?
        .max(RATE_WINDOW.as_secs());

        let admin_ids = match lookup("ADMIN_IDS").filter(|s| !s.trim().is_empty()) {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<u64>()
                        .map_err(|_| Error::invalid_config("ADMIN_IDS", s))
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(Self {
            messages_per_minute,
            max_similar_messages,
            block_minutes,
            sweep_interval_seconds,
            idle_seconds,
            admin_ids,
        })
    }

    /// Limiter configuration derived from these settings
    pub fn rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig {
            messages_per_minute: self.messages_per_minute,
            max_similar_messages: self.max_similar_messages,
            block_duration: Duration::from_secs(self.block_minutes.saturating_mul(60)),
        }
    }

    /// Sweep interval, `None` when the sweeper is disabled
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_seconds > 0).then(|| Duration::from_secs(self.sweep_interval_seconds))
    }

    pub fn idle_threshold(&self) -> Duration {
        Duration::from_secs(self.idle_seconds)
    }
}

/// Missing or empty keys fall back to the default; garbage is an error
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key).filter(|s| !s.trim().is_empty()) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => Ok(value),
            Err(_) => Err(Error::invalid_config(key, raw)),
        },
        None => Ok(default),
    }
}
