//! Dashboard snapshot composition.
//!
//! # Responsibility
//! - Compose profile, today's tasks, scores and goal cards in one read.
//!
//! # Invariants
//! - Scores are recomputed from the same task list that is returned.
//! - Goal cards use clamped display progress; goals keep raw values.

use crate::model::goal::Goal;
use crate::model::task::Task;
use crate::repo::goal_repo::GoalRepository;
use crate::repo::profile_repo::ProfileRepository;
use crate::repo::task_repo::{TaskListQuery, TaskRepository};
use crate::scoring::{partition_by_kind, protocol_score, tactical_score};
use crate::service::profile_service::ProfileView;
use crate::service::{session_owner, ServiceResult};
use crate::session::Session;
use crate::window::{window, WindowMode};
use chrono::{DateTime, TimeZone};
use log::debug;
use serde::Serialize;

/// Goal with its rendered progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalCard {
    pub goal: Goal,
    /// Clamped to `[0, 100]`.
    pub progress: f64,
    pub complete: bool,
}

impl From<Goal> for GoalCard {
    fn from(goal: Goal) -> Self {
        Self {
            progress: goal.display_progress(),
            complete: goal.is_complete(),
            goal,
        }
    }
}

/// Everything the home screen renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub profile: ProfileView,
    pub protocol: Vec<Task>,
    pub tactical: Vec<Task>,
    pub protocol_score: u8,
    pub tactical_score: u8,
    pub goals: Vec<GoalCard>,
}

/// Read-only service over the task, goal and profile repositories.
pub struct DashboardService<T, G, P>
where
    T: TaskRepository,
    G: GoalRepository,
    P: ProfileRepository,
{
    tasks: T,
    goals: G,
    profiles: P,
}

impl<T, G, P> DashboardService<T, G, P>
where
    T: TaskRepository,
    G: GoalRepository,
    P: ProfileRepository,
{
    pub fn new(tasks: T, goals: G, profiles: P) -> Self {
        Self {
            tasks,
            goals,
            profiles,
        }
    }

    /// Builds the snapshot for `now`'s day. `None` without an owner.
    pub fn build_dashboard<Tz: TimeZone>(
        &self,
        session: &Session,
        now: &DateTime<Tz>,
    ) -> ServiceResult<Option<Dashboard>> {
        let Some(owner) = session_owner(session, "dashboard_build") else {
            return Ok(None);
        };

        let profile = self.profiles.ensure_profile(owner)?;
        let today = self.tasks.list_tasks(
            owner,
            &TaskListQuery {
                window: Some(window(WindowMode::Day, now)),
                kind: None,
            },
        )?;
        let protocol_score = protocol_score(&today);
        let tactical_score = tactical_score(&today);
        let (protocol, tactical) = partition_by_kind(today);
        let goals: Vec<GoalCard> = self
            .goals
            .list_goals(owner)?
            .into_iter()
            .map(GoalCard::from)
            .collect();

        debug!(
            "event=dashboard_build module=dashboard status=ok protocol={} tactical={} goals={}",
            protocol.len(),
            tactical.len(),
            goals.len()
        );
        Ok(Some(Dashboard {
            profile: profile.into(),
            protocol,
            tactical,
            protocol_score,
            tactical_score,
            goals,
        }))
    }
}
