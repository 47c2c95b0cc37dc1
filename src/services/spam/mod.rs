pub mod clock;
pub mod decision;
pub mod rate_limiter;
pub mod sweeper;
pub mod timeout_calculator;

pub use decision::{Decision, Rejection};
pub use rate_limiter::{RateLimitConfig, RateLimiter};
