//! Processor settings port.

use std::collections::HashMap;

/// Read-only access to per-processor settings.
pub trait SettingsProvider: Send + Sync {
    fn get_setting(&self, key: &str) -> Option<String>;

    /// Setting value, or `default` when unset.
    fn setting_or(&self, key: &str, default: &str) -> String {
        self.get_setting(key)
            .unwrap_or_else(|| default.to_string())
    }
}

impl SettingsProvider for HashMap<String, String> {
    fn get_setting(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_map_settings_fall_back_to_default() {
        let mut settings = HashMap::new();
        settings.insert("api_key".to_string(), "abc".to_string());

        assert_eq!(settings.get_setting("api_key").as_deref(), Some("abc"));
        assert_eq!(settings.setting_or("sandbox", "true"), "true");
        assert_eq!(settings.setting_or("api_key", "x"), "abc");
    }
}
