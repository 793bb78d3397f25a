//! Reminder and alert evaluation.
//!
//! # Responsibility
//! - Decide which notifications are due at a given instant.
//! - Hand them to a platform `Notifier` when permitted.
//!
//! # Invariants
//! - Checks are one-shot evaluations over the records passed in. Nothing
//!   here schedules or repeats work.
//! - Nothing is sent unless settings are enabled and permission is granted.

pub mod message;
pub mod settings;

use crate::model::goal::Goal;
use crate::model::task::{Task, TaskType};
use crate::window::{local_instant, window, WindowMode};
use chrono::{DateTime, TimeZone};
use log::{debug, warn};
use serde::Serialize;

pub use message::{congratulations, deadline_alert, task_reminder, Notification, Urgency};
pub use settings::{NotificationSettings, NotificationSettingsPatch, SettingsError, SettingsStore};

/// Deadlines further away than this many days produce no alert.
pub const DEADLINE_HORIZON_DAYS: i64 = 7;

/// Platform notification permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Granted,
    Denied,
    /// Not decided yet; a request may still be granted.
    Prompt,
    Unsupported,
}

/// Platform notification capability.
pub trait Notifier {
    fn permission(&self) -> Permission;
    /// Asks the platform for permission and returns whether it is granted.
    fn request_permission(&mut self) -> bool;
    /// Fire-and-forget delivery.
    fn send(&self, notification: &Notification);
}

/// Sends `notifications` through `notifier` and returns how many were sent.
pub fn dispatch(
    notifier: &dyn Notifier,
    settings: &NotificationSettings,
    notifications: &[Notification],
) -> usize {
    if !settings.enabled {
        debug!("event=notify_dispatch module=notify status=skipped reason=disabled");
        return 0;
    }
    let permission = notifier.permission();
    if permission != Permission::Granted {
        debug!(
            "event=notify_dispatch module=notify status=skipped reason=permission_{:?}",
            permission
        );
        return 0;
    }

    for notification in notifications {
        notifier.send(notification);
    }
    debug!(
        "event=notify_dispatch module=notify status=ok sent={}",
        notifications.len()
    );
    notifications.len()
}

/// Reminders for today's unfinished protocol tasks once reminder time passed.
pub fn check_protocol_tasks<Tz: TimeZone>(
    settings: &NotificationSettings,
    tasks: &[Task],
    now: &DateTime<Tz>,
) -> Vec<Notification> {
    if !settings.enabled || !settings.protocol_reminders {
        return Vec::new();
    }
    let reminder_at = match settings.reminder_at() {
        Ok(time) => time,
        Err(err) => {
            warn!("event=notify_check module=notify status=error check=protocol error={err}");
            return Vec::new();
        }
    };
    if now.time() < reminder_at {
        return Vec::new();
    }

    let today = window(WindowMode::Day, now);
    tasks
        .iter()
        .filter(|task| task.is_protocol() && !task.completed && today.contains(task.date))
        .map(|task| task_reminder(&task.title, TaskType::Protocol))
        .collect()
}

/// Alerts for unfinished goals whose deadline falls within the horizon.
///
/// Days left counts local calendar days, so a deadline later today is 0.
/// Overdue goals produce nothing.
pub fn check_project_deadlines<Tz: TimeZone>(
    settings: &NotificationSettings,
    goals: &[Goal],
    now: &DateTime<Tz>,
) -> Vec<Notification> {
    if !settings.enabled || !settings.project_deadlines {
        return Vec::new();
    }

    let today = now.date_naive();
    let tz = now.timezone();
    goals
        .iter()
        .filter(|goal| !goal.is_complete())
        .filter_map(|goal| {
            let deadline = local_instant(goal.deadline?, &tz)?;
            let days_left = (deadline.date_naive() - today).num_days();
            (0..=DEADLINE_HORIZON_DAYS)
                .contains(&days_left)
                .then(|| deadline_alert(&goal.title, days_left))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        check_project_deadlines, check_protocol_tasks, dispatch, NotificationSettings,
        Notifier, Permission,
    };
    use crate::model::goal::Goal;
    use crate::model::owner::OwnerId;
    use crate::model::task::{Recurrence, Task};
    use crate::notify::Notification;
    use chrono::{DateTime, FixedOffset, TimeZone};
    use std::cell::RefCell;
    use uuid::Uuid;

    fn tz() -> FixedOffset {
        FixedOffset::east_opt(3600).expect("valid offset")
    }

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
        tz().with_ymd_and_hms(2026, 10, day, hour, minute, 0)
            .single()
            .expect("unambiguous local time")
    }

    fn owner() -> OwnerId {
        OwnerId::parse("owner").expect("owner")
    }

    fn task(title: &str, recurrence: Recurrence, completed: bool, date: i64) -> Task {
        Task {
            id: Uuid::new_v4(),
            owner_id: owner(),
            title: title.to_string(),
            recurrence,
            completed,
            date,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn goal(title: &str, current: i64, deadline: Option<i64>) -> Goal {
        Goal {
            id: Uuid::new_v4(),
            owner_id: owner(),
            title: title.to_string(),
            target: 10,
            current,
            deadline,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        permission: Option<Permission>,
        sent: RefCell<Vec<Notification>>,
    }

    impl Notifier for RecordingNotifier {
        fn permission(&self) -> Permission {
            self.permission.unwrap_or(Permission::Prompt)
        }

        fn request_permission(&mut self) -> bool {
            self.permission = Some(Permission::Granted);
            true
        }

        fn send(&self, notification: &Notification) {
            self.sent.borrow_mut().push(notification.clone());
        }
    }

    #[test]
    fn protocol_check_waits_for_reminder_time() {
        let noon = at(14, 12, 0).timestamp_millis();
        let tasks = vec![
            task("Sport", Recurrence::Daily, false, noon),
            task("Lecture", Recurrence::Daily, true, noon),
            task("Appel", Recurrence::Once, false, noon),
        ];
        let settings = NotificationSettings::default();

        assert!(check_protocol_tasks(&settings, &tasks, &at(14, 19, 59)).is_empty());
        let due = check_protocol_tasks(&settings, &tasks, &at(14, 20, 0));
        assert_eq!(due.len(), 1);
        assert!(due[0].body.ends_with("Sport"));
    }

    #[test]
    fn protocol_check_ignores_other_days_and_disabled_settings() {
        let yesterday = at(13, 12, 0).timestamp_millis();
        let tasks = vec![task("Sport", Recurrence::Daily, false, yesterday)];
        let settings = NotificationSettings::default();
        assert!(check_protocol_tasks(&settings, &tasks, &at(14, 21, 0)).is_empty());

        let today = vec![task("Sport", Recurrence::Daily, false, at(14, 8, 0).timestamp_millis())];
        let muted = NotificationSettings {
            protocol_reminders: false,
            ..NotificationSettings::default()
        };
        assert!(check_protocol_tasks(&muted, &today, &at(14, 21, 0)).is_empty());
    }

    #[test]
    fn deadline_check_respects_horizon_and_completion() {
        let now = at(14, 9, 0);
        let goals = vec![
            goal("Today", 0, Some(at(14, 23, 0).timestamp_millis())),
            goal("Soon", 3, Some(at(17, 12, 0).timestamp_millis())),
            goal("Far", 0, Some(at(30, 12, 0).timestamp_millis())),
            goal("Late", 0, Some(at(10, 12, 0).timestamp_millis())),
            goal("Done", 10, Some(at(15, 12, 0).timestamp_millis())),
            goal("Open", 0, None),
        ];

        let alerts = check_project_deadlines(&NotificationSettings::default(), &goals, &now);
        let tags: Vec<&str> = alerts.iter().map(|alert| alert.tag.as_str()).collect();
        assert_eq!(tags, vec!["project-Today", "project-Soon"]);
        assert!(alerts[0].require_interaction);
        assert!(!alerts[1].require_interaction);
    }

    #[test]
    fn dispatch_requires_permission_and_enabled_settings() {
        let mut notifier = RecordingNotifier::default();
        let settings = NotificationSettings::default();
        let batch = vec![super::congratulations("bravo")];

        assert_eq!(dispatch(&notifier, &settings, &batch), 0);
        assert!(notifier.request_permission());
        assert_eq!(dispatch(&notifier, &settings, &batch), 1);

        let disabled = NotificationSettings {
            enabled: false,
            ..NotificationSettings::default()
        };
        assert_eq!(dispatch(&notifier, &disabled, &batch), 0);
        assert_eq!(notifier.sent.borrow().len(), 1);
    }
}
