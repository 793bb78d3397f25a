//! Task use-case service.
//!
//! # Responsibility
//! - Schedule protocol/tactical tasks on a calendar day.
//! - Answer day/window queries and calendar markers.
//! - Toggle completion together with the xp reward.
//!
//! # Invariants
//! - Tasks created for a day are stored at local noon of that day.
//! - Toggling keeps `id` and `date`; only `completed`/`updated_at` move.

use crate::live::{ChangeHub, ChangeKind, Collection};
use crate::model::task::{NewTask, Recurrence, Task, TaskId};
use crate::repo::task_repo::{CompletionChange, TaskListQuery, TaskRepository};
use crate::service::{session_owner, Publisher, ServiceError, ServiceResult};
use crate::session::Session;
use crate::window::{day_window, local_instant, noon_of, window, WindowMode};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use log::info;
use std::collections::BTreeSet;

/// Use-case service for tasks.
pub struct TaskService<R: TaskRepository> {
    repo: R,
    publisher: Publisher,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            publisher: Publisher::default(),
        }
    }

    /// Creates a service that publishes committed writes to `hub`.
    pub fn with_hub(repo: R, hub: ChangeHub) -> Self {
        Self {
            repo,
            publisher: Publisher::new(Some(hub)),
        }
    }

    /// Adds a task on `day`, stored at local noon.
    pub fn add_task<Tz: TimeZone>(
        &self,
        session: &Session,
        title: &str,
        recurrence: Recurrence,
        day: NaiveDate,
        tz: &Tz,
    ) -> ServiceResult<Option<Task>> {
        let instant = noon_of(day, tz).timestamp_millis();
        self.add_task_at(session, title, recurrence, instant)
    }

    /// Adds a task at an explicit instant (epoch milliseconds).
    pub fn add_task_at(
        &self,
        session: &Session,
        title: &str,
        recurrence: Recurrence,
        instant: i64,
    ) -> ServiceResult<Option<Task>> {
        let Some(owner) = session_owner(session, "task_create") else {
            return Ok(None);
        };

        let request = NewTask::new(title, recurrence, instant);
        let created = self.repo.create_task(owner, &request)?;
        let stored = self
            .repo
            .get_task(owner, created.id)?
            .ok_or(ServiceError::Inconsistent("task missing after create"))?;

        info!(
            "event=task_create module=task status=ok id={} type={} frequency={}",
            stored.id,
            stored.kind().as_str(),
            stored.recurrence.frequency().as_str()
        );
        self.publisher
            .publish(owner, Collection::Tasks, ChangeKind::Created, Some(stored.id));
        Ok(Some(stored))
    }

    /// Tasks of `day`, or of `now`'s day when `None`, ordered by date.
    pub fn list_tasks<Tz: TimeZone>(
        &self,
        session: &Session,
        day: Option<NaiveDate>,
        now: &DateTime<Tz>,
    ) -> ServiceResult<Vec<Task>> {
        let Some(owner) = session_owner(session, "task_list") else {
            return Ok(Vec::new());
        };

        let day = day.unwrap_or_else(|| now.date_naive());
        let query = TaskListQuery {
            window: Some(day_window(day, &now.timezone())),
            kind: None,
        };
        Ok(self.repo.list_tasks(owner, &query)?)
    }

    /// Tasks in the day/week/month window around `now`.
    pub fn list_window<Tz: TimeZone>(
        &self,
        session: &Session,
        mode: WindowMode,
        now: &DateTime<Tz>,
    ) -> ServiceResult<Vec<Task>> {
        let Some(owner) = session_owner(session, "task_list") else {
            return Ok(Vec::new());
        };

        let query = TaskListQuery {
            window: Some(window(mode, now)),
            kind: None,
        };
        Ok(self.repo.list_tasks(owner, &query)?)
    }

    pub fn get_task(&self, session: &Session, id: TaskId) -> ServiceResult<Option<Task>> {
        let Some(owner) = session_owner(session, "task_get") else {
            return Ok(None);
        };
        Ok(self.repo.get_task(owner, id)?)
    }

    /// Sets completion and applies the ±50 xp reward atomically.
    ///
    /// Returns `None` without an owner. `xp` is `None` when nothing changed.
    pub fn toggle(
        &self,
        session: &Session,
        id: TaskId,
        completed: bool,
    ) -> ServiceResult<Option<CompletionChange>> {
        let Some(owner) = session_owner(session, "task_toggle") else {
            return Ok(None);
        };

        let change = self.repo.set_completed(owner, id, completed)?;
        match &change.xp {
            Some(xp) => {
                info!(
                    "event=task_toggle module=task status=ok id={} completed={} xp={} level={} leveled_up={}",
                    id, completed, xp.after.xp, xp.after.level, xp.leveled_up
                );
                self.publisher
                    .publish(owner, Collection::Tasks, ChangeKind::Updated, Some(id));
                self.publisher
                    .publish(owner, Collection::Profile, ChangeKind::Updated, None);
            }
            None => {
                info!(
                    "event=task_toggle module=task status=unchanged id={} completed={}",
                    id, completed
                );
            }
        }
        Ok(Some(change))
    }

    /// Hard-deletes a task. Without an owner this does nothing.
    pub fn delete(&self, session: &Session, id: TaskId) -> ServiceResult<()> {
        let Some(owner) = session_owner(session, "task_delete") else {
            return Ok(());
        };

        self.repo.delete_task(owner, id)?;
        info!("event=task_delete module=task status=ok id={}", id);
        self.publisher
            .publish(owner, Collection::Tasks, ChangeKind::Deleted, Some(id));
        Ok(())
    }

    /// Day-of-month numbers in `now`'s month holding at least one task.
    pub fn task_days_in_month<Tz: TimeZone>(
        &self,
        session: &Session,
        now: &DateTime<Tz>,
    ) -> ServiceResult<BTreeSet<u32>> {
        let tasks = self.list_window(session, WindowMode::Month, now)?;
        let tz = now.timezone();
        Ok(tasks
            .iter()
            .filter_map(|task| local_instant(task.date, &tz))
            .map(|instant| instant.day())
            .collect())
    }
}
