//! Configuration sanity checks.
//!
//! Nothing here stops startup. The returned messages are logged so an
//! operator can spot settings that will make downstream services useless.

use crate::config::types::{AppConfig, SqlBackend};

/// Collect warnings about a resolved configuration.
pub fn config_warnings(config: &AppConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.discord.token.is_empty() {
        warnings.push("discord.token is empty - the Discord bot cannot log in".to_string());
    }
    if config.discord.prefixs.is_empty() {
        warnings.push("discord.prefixs is empty - text commands are disabled".to_string());
    }

    if config.servers.is_empty() {
        warnings.push("servers is empty - no ARK servers will be managed".to_string());
    }

    if !(0..=100).contains(&config.low_battery) {
        warnings.push(format!(
            "low_battery must be a percentage (got {})",
            config.low_battery
        ));
    }

    if let SqlBackend::Networked { host, .. } = config.sql.backend() {
        if host.is_empty() {
            warnings.push("sql.mysql is enabled but sql.host is empty".to_string());
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::default_tree;

    fn default_config() -> AppConfig {
        AppConfig::from_tree(&default_tree()).unwrap()
    }

    #[test]
    fn test_defaults_warn_about_unset_values() {
        let warnings = config_warnings(&default_config());

        assert!(warnings.iter().any(|w| w.contains("discord.token")));
        assert!(warnings.iter().any(|w| w.contains("servers")));
        assert!(!warnings.iter().any(|w| w.contains("low_battery")));
    }

    #[test]
    fn test_low_battery_out_of_range() {
        let mut config = default_config();
        config.low_battery = 150;

        let warnings = config_warnings(&config);
        assert!(warnings.iter().any(|w| w.contains("low_battery")));
    }

    #[test]
    fn test_networked_sql_without_host() {
        let mut config = default_config();
        config.sql.mysql = true;

        let warnings = config_warnings(&config);
        assert!(warnings.iter().any(|w| w.contains("sql.host")));
    }

    #[test]
    fn test_configured_discord_is_quiet() {
        let mut config = default_config();
        config.discord.token = "token".to_string();
        config.discord.prefixs = vec!["!".to_string()];

        let warnings = config_warnings(&config);
        assert!(!warnings.iter().any(|w| w.starts_with("discord")));
    }
}
