//! Task domain model.
//!
//! # Responsibility
//! - Define protocol (recurring) and tactical (one-off) task records.
//! - Own the recurrence rules and weekday-set validation.
//!
//! # Invariants
//! - `Recurrence::Once` is always tactical; `Daily`/`Custom` are protocol.
//! - A custom weekday set is non-empty and only holds indexes 0..=6
//!   (0 = Sunday).
//! - A recurring task is one stored record; no per-day occurrences exist.

use crate::model::owner::OwnerId;
use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use thiserror::Error;
use uuid::Uuid;

/// Stable identifier of a task record.
pub type TaskId = Uuid;

/// Task category shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Recurring routine item.
    Protocol,
    /// One-off item.
    Tactical,
}

impl TaskType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Protocol => "protocol",
            Self::Tactical => "tactical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "protocol" => Some(Self::Protocol),
            "tactical" => Some(Self::Tactical),
            _ => None,
        }
    }
}

impl Display for TaskType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage-level recurrence discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Once,
    Daily,
    Custom,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Daily => "daily",
            Self::Custom => "custom",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "once" => Some(Self::Once),
            "daily" => Some(Self::Daily),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors for task construction and persisted task state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskValidationError {
    #[error("task title must not be blank")]
    BlankTitle,
    #[error("custom recurrence requires at least one weekday")]
    EmptyCustomDays,
    #[error("weekday index {0} is out of range 0..=6")]
    WeekdayOutOfRange(u8),
    #[error("frequency `{0}` does not accept custom weekdays")]
    UnexpectedCustomDays(Frequency),
    #[error("task type `{task_type}` does not match frequency `{frequency}`")]
    TypeMismatch {
        frequency: Frequency,
        task_type: TaskType,
    },
}

/// Non-empty set of weekday indexes, 0 = Sunday through 6 = Saturday.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct WeekdaySet(BTreeSet<u8>);

impl WeekdaySet {
    /// Builds a set from weekday indexes. Duplicates collapse.
    pub fn new(days: impl IntoIterator<Item = u8>) -> Result<Self, TaskValidationError> {
        let mut set = BTreeSet::new();
        for day in days {
            if day > 6 {
                return Err(TaskValidationError::WeekdayOutOfRange(day));
            }
            set.insert(day);
        }
        if set.is_empty() {
            return Err(TaskValidationError::EmptyCustomDays);
        }
        Ok(Self(set))
    }

    pub fn contains(&self, weekday: Weekday) -> bool {
        self.0.contains(&sunday_index(weekday))
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<u8>> for WeekdaySet {
    type Error = TaskValidationError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WeekdaySet> for Vec<u8> {
    fn from(value: WeekdaySet) -> Self {
        value.to_vec()
    }
}

/// Recurrence rule of a task. The task type follows from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "frequency", content = "custom_days", rename_all = "snake_case")]
pub enum Recurrence {
    Once,
    Daily,
    Custom(WeekdaySet),
}

impl Recurrence {
    /// Rebuilds a recurrence from storage columns.
    ///
    /// An empty day list is tolerated for `once`/`daily`; a non-empty one is
    /// rejected since it would be silently ignored otherwise.
    pub fn from_parts(
        frequency: Frequency,
        custom_days: Option<Vec<u8>>,
    ) -> Result<Self, TaskValidationError> {
        match frequency {
            Frequency::Custom => {
                WeekdaySet::new(custom_days.unwrap_or_default()).map(Self::Custom)
            }
            Frequency::Once | Frequency::Daily => {
                if custom_days.is_some_and(|days| !days.is_empty()) {
                    return Err(TaskValidationError::UnexpectedCustomDays(frequency));
                }
                Ok(if frequency == Frequency::Once {
                    Self::Once
                } else {
                    Self::Daily
                })
            }
        }
    }

    pub fn frequency(&self) -> Frequency {
        match self {
            Self::Once => Frequency::Once,
            Self::Daily => Frequency::Daily,
            Self::Custom(_) => Frequency::Custom,
        }
    }

    pub fn task_type(&self) -> TaskType {
        match self {
            Self::Once => TaskType::Tactical,
            Self::Daily | Self::Custom(_) => TaskType::Protocol,
        }
    }

    pub fn custom_days(&self) -> Option<&WeekdaySet> {
        match self {
            Self::Custom(days) => Some(days),
            Self::Once | Self::Daily => None,
        }
    }

    /// Whether the rule nominally applies on `weekday`.
    ///
    /// One-off tasks are bound to their date, not a weekday, so they never
    /// match. This is informational: no occurrences are materialized from it.
    pub fn matches_weekday(&self, weekday: Weekday) -> bool {
        match self {
            Self::Once => false,
            Self::Daily => true,
            Self::Custom(days) => days.contains(weekday),
        }
    }

    /// Checks that a stored type column agrees with this recurrence.
    pub fn ensure_type(&self, task_type: TaskType) -> Result<(), TaskValidationError> {
        if self.task_type() == task_type {
            Ok(())
        } else {
            Err(TaskValidationError::TypeMismatch {
                frequency: self.frequency(),
                task_type,
            })
        }
    }
}

/// Persisted task record.
///
/// JSON carries the derived `type` next to `recurrence`; on the way back in
/// the two must agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "TaskJson", try_from = "TaskJson")]
pub struct Task {
    pub id: TaskId,
    pub owner_id: OwnerId,
    pub title: String,
    pub recurrence: Recurrence,
    pub completed: bool,
    /// Scheduled instant, epoch milliseconds.
    pub date: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Serialize, Deserialize)]
struct TaskJson {
    id: TaskId,
    owner_id: OwnerId,
    title: String,
    #[serde(rename = "type")]
    task_type: TaskType,
    recurrence: Recurrence,
    completed: bool,
    date: i64,
    created_at: i64,
    updated_at: i64,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            task_type: task.kind(),
            id: task.id,
            owner_id: task.owner_id,
            title: task.title,
            recurrence: task.recurrence,
            completed: task.completed,
            date: task.date,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

impl TryFrom<TaskJson> for Task {
    type Error = TaskValidationError;

    fn try_from(json: TaskJson) -> Result<Self, Self::Error> {
        json.recurrence.ensure_type(json.task_type)?;
        Ok(Self {
            id: json.id,
            owner_id: json.owner_id,
            title: json.title,
            recurrence: json.recurrence,
            completed: json.completed,
            date: json.date,
            created_at: json.created_at,
            updated_at: json.updated_at,
        })
    }
}

impl Task {
    pub fn kind(&self) -> TaskType {
        self.recurrence.task_type()
    }

    pub fn is_protocol(&self) -> bool {
        self.kind() == TaskType::Protocol
    }

    pub fn is_tactical(&self) -> bool {
        self.kind() == TaskType::Tactical
    }
}

/// Creation request for a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub id: TaskId,
    pub title: String,
    pub recurrence: Recurrence,
    /// Scheduled instant, epoch milliseconds.
    pub date: i64,
}

impl NewTask {
    /// Creates a request with a generated stable id and a trimmed title.
    pub fn new(title: impl Into<String>, recurrence: Recurrence, date: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into().trim().to_string(),
            recurrence,
            date,
        }
    }

    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        Ok(())
    }
}

/// Day-of-week index used by the weekday set, 0 = Sunday.
pub fn sunday_index(weekday: Weekday) -> u8 {
    // num_days_from_sunday is always < 7
    weekday.num_days_from_sunday() as u8
}

/// Weekday of a calendar date in the same indexing as [`WeekdaySet`].
pub fn weekday_index_of(date: &impl Datelike) -> u8 {
    sunday_index(date.weekday())
}
