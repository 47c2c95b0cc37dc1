use crate::config::Settings;

/// Check if a user is on the admin allow-list
pub fn is_admin(settings: &Settings, user_id: u64) -> bool {
    settings.admin_ids.contains(&user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_admin() {
        let settings = Settings::from_lookup(|key| {
            (key == "ADMIN_IDS").then(|| "10,20".to_string())
        })
        .unwrap();

        assert!(is_admin(&settings, 10));
        assert!(is_admin(&settings, 20));
        assert!(!is_admin(&settings, 30));
    }
}
