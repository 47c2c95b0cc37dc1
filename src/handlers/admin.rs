use tracing::info;

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::services::spam::clock::Clock;
use crate::utils::permissions::is_admin;

/// Lift any block on `target_id` and forget their message history
pub fn unblock_user<C: Clock>(data: &Data<C>, actor_id: u64, target_id: u64) -> Result<(), Error> {
    if !is_admin(&data.settings, actor_id) {
        return Err(Error::PermissionDenied(format!(
            "user {} may not unblock users",
            actor_id
        )));
    }

    data.rate_limiter.reset(target_id);
    info!("Admin {} unblocked user {}", actor_id, target_id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::services::spam::clock::ManualClock;

    fn data() -> Data<ManualClock> {
        let settings = Settings::from_lookup(|key| match key {
            "RATE_LIMIT_MESSAGES_PER_MINUTE" => Some("1".to_string()),
            "ADMIN_IDS" => Some("1".to_string()),
            _ => None,
        })
        .unwrap();
        Data::with_clock(settings, ManualClock::new())
    }

    #[test]
    fn test_admin_can_unblock() {
        let data = data();
        assert!(data.rate_limiter.evaluate(5, "a").is_allowed());
        assert!(!data.rate_limiter.evaluate(5, "b").is_allowed());

        unblock_user(&data, 1, 5).unwrap();
        assert!(data.rate_limiter.evaluate(5, "b").is_allowed());
    }

    #[test]
    fn test_non_admin_is_refused() {
        let data = data();
        assert!(data.rate_limiter.evaluate(5, "a").is_allowed());
        assert!(!data.rate_limiter.evaluate(5, "b").is_allowed());

        let err = unblock_user(&data, 5, 5).unwrap_err();
        assert!(matches!(err, Error::PermissionDenied(_)));
        assert!(!data.rate_limiter.evaluate(5, "c").is_allowed());
    }

    #[test]
    fn test_unblock_unknown_user() {
        let data = data();
        assert!(unblock_user(&data, 1, 999).is_ok());
    }
}
