//! Process configuration resolved from environment variables.
//!
//! # Invariants
//! - Unset or blank variables fall back to defaults; resolution never fails.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "DJALIL_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "DJALIL_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "DJALIL_LOG_DIR";
pub const SETTINGS_PATH_ENV: &str = "DJALIL_SETTINGS_PATH";

const DEFAULT_DB_FILE_NAME: &str = "djalil_os.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "djalil_os_logs";
const DEFAULT_SETTINGS_FILE_NAME: &str = "djalil_os_notifications.json";

/// Resolved core configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
    /// Notification settings JSON file.
    pub settings_path: PathBuf,
}

impl Default for CoreConfig {
    fn default() -> Self {
        let temp = std::env::temp_dir();
        Self {
            db_path: temp.join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: temp.join(DEFAULT_LOG_DIR_NAME),
            settings_path: temp.join(DEFAULT_SETTINGS_FILE_NAME),
        }
    }
}

impl CoreConfig {
    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        Self {
            db_path: value(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            log_level: value(LOG_LEVEL_ENV).unwrap_or(defaults.log_level),
            log_dir: value(LOG_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            settings_path: value(SETTINGS_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.settings_path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn missing_and_blank_values_use_defaults() {
        let env = HashMap::from([(LOG_LEVEL_ENV, "   ".to_string())]);
        let config = CoreConfig::from_lookup(|key| env.get(key).cloned());
        assert_eq!(config, CoreConfig::default());
        assert!(config.db_path.ends_with("djalil_os.sqlite3"));
    }

    #[test]
    fn explicit_values_are_trimmed() {
        let env = HashMap::from([
            (DB_PATH_ENV, " /data/app.sqlite3 ".to_string()),
            (LOG_LEVEL_ENV, "warn".to_string()),
            (LOG_DIR_ENV, "/var/log/djalil".to_string()),
        ]);
        let config = CoreConfig::from_lookup(|key| env.get(key).cloned());
        assert_eq!(config.db_path, PathBuf::from("/data/app.sqlite3"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, PathBuf::from("/var/log/djalil"));
    }
}
