//! Notification payload builders.

use crate::model::task::TaskType;
use serde::Serialize;

/// Payload handed to a [`super::Notifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Replacement key; a newer notification with the same tag supersedes it.
    pub tag: String,
    pub require_interaction: bool,
}

/// Urgency bucket of a deadline alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Due today or tomorrow.
    Critical,
    /// Due within three days.
    Warning,
    Scheduled,
}

impl Urgency {
    pub fn for_days_left(days_left: i64) -> Self {
        if days_left <= 1 {
            Self::Critical
        } else if days_left <= 3 {
            Self::Warning
        } else {
            Self::Scheduled
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Critical => "🚨",
            Self::Warning => "⚠️",
            Self::Scheduled => "📅",
        }
    }
}

pub fn task_reminder(task_title: &str, kind: TaskType) -> Notification {
    let label = match kind {
        TaskType::Protocol => "Protocole",
        TaskType::Tactical => "Tactique",
    };
    Notification {
        title: format!("⏰ Rappel {label}"),
        body: format!("N'oubliez pas : {task_title}"),
        tag: format!("task-{}", kind.as_str()),
        require_interaction: false,
    }
}

pub fn deadline_alert(project_title: &str, days_left: i64) -> Notification {
    let urgency = Urgency::for_days_left(days_left);
    let body = match days_left {
        0 => "Échéance aujourd'hui !".to_string(),
        1 => "Échéance demain !".to_string(),
        days => format!("Échéance dans {days} jours"),
    };
    Notification {
        title: format!("{} Projet : {project_title}", urgency.symbol()),
        body,
        tag: format!("project-{project_title}"),
        require_interaction: days_left <= 1,
    }
}

pub fn congratulations(message: &str) -> Notification {
    Notification {
        title: "🎉 Félicitations !".to_string(),
        body: message.to_string(),
        tag: "congratulations".to_string(),
        require_interaction: false,
    }
}
