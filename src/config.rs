//! Configuration Module
//!
//! Process-wide defaults for memoized functions, loadable from environment
//! variables or embedded in a host application's own configuration.

use std::env;
use std::time::Duration;

use serde::Deserialize;

/// Memoization defaults.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default max age in milliseconds, None = entries never expire
    pub max_age_ms: Option<u64>,
    /// Whether expiry timers are spawned on the tokio runtime
    pub expiry_timers: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMOIZE_MAX_AGE_MS` - Default max age in milliseconds (default: unset)
    /// - `MEMOIZE_EXPIRY_TIMERS` - Spawn expiry timers (default: true)
    pub fn from_env() -> Self {
        Self {
            max_age_ms: env::var("MEMOIZE_MAX_AGE_MS")
                .ok()
                .and_then(|v| v.parse().ok()),
            expiry_timers: env::var("MEMOIZE_EXPIRY_TIMERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }

    /// Returns the configured max age, if any.
    pub fn max_age(&self) -> Option<Duration> {
        self.max_age_ms.map(Duration::from_millis)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_age_ms: None,
            expiry_timers: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_age_ms, None);
        assert!(config.expiry_timers);
        assert_eq!(config.max_age(), None);
    }

    #[test]
    fn test_config_from_env() {
        env::set_var("MEMOIZE_MAX_AGE_MS", "250");
        env::set_var("MEMOIZE_EXPIRY_TIMERS", "false");

        let config = Config::from_env();
        assert_eq!(config.max_age(), Some(Duration::from_millis(250)));
        assert!(!config.expiry_timers);

        // Unparseable values fall back to defaults
        env::set_var("MEMOIZE_MAX_AGE_MS", "soon");
        env::remove_var("MEMOIZE_EXPIRY_TIMERS");

        let config = Config::from_env();
        assert_eq!(config, Config::default());

        env::remove_var("MEMOIZE_MAX_AGE_MS");
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: Config = serde_json::from_str(r#"{"max_age_ms": 100}"#).unwrap();
        assert_eq!(config.max_age_ms, Some(100));
        assert!(config.expiry_timers);
    }
}
