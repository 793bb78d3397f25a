//! Notification preferences and their JSON persistence.
//!
//! # Invariants
//! - `reminder_time` is always a valid `HH:mm` string once inside a
//!   `NotificationSettings` produced by this module.
//! - A missing or unreadable settings file yields the defaults.

use chrono::NaiveTime;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const REMINDER_TIME_FORMAT: &str = "%H:%M";
const DEFAULT_REMINDER_TIME: &str = "20:00";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("reminder time must be HH:mm, got `{0}`")]
    InvalidReminderTime(String),
    #[error("settings io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// User notification preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub enabled: bool,
    pub protocol_reminders: bool,
    pub project_deadlines: bool,
    /// Local wall-clock time, `HH:mm`.
    pub reminder_time: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            protocol_reminders: true,
            project_deadlines: true,
            reminder_time: DEFAULT_REMINDER_TIME.to_string(),
        }
    }
}

impl NotificationSettings {
    /// Parsed reminder time.
    pub fn reminder_at(&self) -> Result<NaiveTime, SettingsError> {
        parse_reminder_time(&self.reminder_time)
    }

    /// Merges a partial update, leaving `self` untouched on invalid input.
    pub fn apply(&mut self, patch: &NotificationSettingsPatch) -> Result<(), SettingsError> {
        if let Some(time) = patch.reminder_time.as_deref() {
            parse_reminder_time(time)?;
        }

        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(protocol_reminders) = patch.protocol_reminders {
            self.protocol_reminders = protocol_reminders;
        }
        if let Some(project_deadlines) = patch.project_deadlines {
            self.project_deadlines = project_deadlines;
        }
        if let Some(time) = patch.reminder_time.as_deref() {
            self.reminder_time = time.trim().to_string();
        }
        Ok(())
    }
}

/// Partial settings update; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettingsPatch {
    pub enabled: Option<bool>,
    pub protocol_reminders: Option<bool>,
    pub project_deadlines: Option<bool>,
    pub reminder_time: Option<String>,
}

fn parse_reminder_time(value: &str) -> Result<NaiveTime, SettingsError> {
    let trimmed = value.trim();
    // chrono accepts single-digit hours for %H; require the padded form.
    if trimmed.len() != 5 {
        return Err(SettingsError::InvalidReminderTime(value.to_string()));
    }
    NaiveTime::parse_from_str(trimmed, REMINDER_TIME_FORMAT)
        .map_err(|_| SettingsError::InvalidReminderTime(value.to_string()))
}

/// File-backed settings store.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads settings, falling back to defaults when absent or malformed.
    pub fn load(&self) -> NotificationSettings {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return NotificationSettings::default();
            }
            Err(err) => {
                warn!(
                    "event=settings_load module=notify status=error path={} error={}",
                    self.path.display(),
                    err
                );
                return NotificationSettings::default();
            }
        };

        match serde_json::from_str::<NotificationSettings>(&raw) {
            Ok(settings) if settings.reminder_at().is_ok() => settings,
            Ok(_) | Err(_) => {
                warn!(
                    "event=settings_load module=notify status=error path={} error=malformed",
                    self.path.display()
                );
                NotificationSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &NotificationSettings) -> Result<(), SettingsError> {
        settings.reminder_at()?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let encoded = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, encoded)?;
        info!(
            "event=settings_save module=notify status=ok path={}",
            self.path.display()
        );
        Ok(())
    }

    /// Loads, patches and persists in one call, returning the new settings.
    pub fn update(
        &self,
        patch: &NotificationSettingsPatch,
    ) -> Result<NotificationSettings, SettingsError> {
        let mut settings = self.load();
        settings.apply(patch)?;
        self.save(&settings)?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::{NotificationSettings, NotificationSettingsPatch, SettingsError, SettingsStore};
    use chrono::NaiveTime;

    #[test]
    fn defaults_match_product_values() {
        let settings = NotificationSettings::default();
        assert!(settings.enabled);
        assert!(settings.protocol_reminders);
        assert!(settings.project_deadlines);
        assert_eq!(
            settings.reminder_at().expect("default time parses"),
            NaiveTime::from_hms_opt(20, 0, 0).expect("valid time")
        );
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let json = serde_json::to_value(NotificationSettings::default()).expect("serialize");
        assert_eq!(json["protocolReminders"], true);
        assert_eq!(json["reminderTime"], "20:00");
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut settings = NotificationSettings::default();
        settings
            .apply(&NotificationSettingsPatch {
                project_deadlines: Some(false),
                reminder_time: Some("07:30".to_string()),
                ..NotificationSettingsPatch::default()
            })
            .expect("valid patch");
        assert!(settings.enabled);
        assert!(!settings.project_deadlines);
        assert_eq!(settings.reminder_time, "07:30");
    }

    #[test]
    fn invalid_time_leaves_settings_unchanged() {
        let mut settings = NotificationSettings::default();
        for bad in ["25:00", "7:30", "noon", ""] {
            let err = settings
                .apply(&NotificationSettingsPatch {
                    enabled: Some(false),
                    reminder_time: Some(bad.to_string()),
                    ..NotificationSettingsPatch::default()
                })
                .expect_err("bad time must be rejected");
            assert!(matches!(err, SettingsError::InvalidReminderTime(_)));
        }
        assert_eq!(settings, NotificationSettings::default());
    }

    #[test]
    fn store_round_trips_and_recovers_from_garbage() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SettingsStore::new(dir.path().join("nested").join("notify.json"));
        assert_eq!(store.load(), NotificationSettings::default());

        let updated = store
            .update(&NotificationSettingsPatch {
                enabled: Some(false),
                ..NotificationSettingsPatch::default()
            })
            .expect("update should persist");
        assert!(!updated.enabled);
        assert_eq!(store.load(), updated);

        std::fs::write(store.path(), "{not json").expect("write garbage");
        assert_eq!(store.load(), NotificationSettings::default());
    }
}
