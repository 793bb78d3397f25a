//! Goal use-case service.

use crate::live::{ChangeHub, ChangeKind, Collection};
use crate::model::goal::{Goal, GoalId, NewGoal};
use crate::repo::goal_repo::GoalRepository;
use crate::service::{session_owner, Publisher, ServiceError, ServiceResult};
use crate::session::Session;
use log::info;

/// Use-case service for goals.
pub struct GoalService<R: GoalRepository> {
    repo: R,
    publisher: Publisher,
}

impl<R: GoalRepository> GoalService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            publisher: Publisher::default(),
        }
    }

    pub fn with_hub(repo: R, hub: ChangeHub) -> Self {
        Self {
            repo,
            publisher: Publisher::new(Some(hub)),
        }
    }

    /// Creates a goal with `current = 0`.
    pub fn add_goal(
        &self,
        session: &Session,
        title: &str,
        target: i64,
        deadline: Option<i64>,
    ) -> ServiceResult<Option<Goal>> {
        let Some(owner) = session_owner(session, "goal_create") else {
            return Ok(None);
        };

        let goal = self
            .repo
            .create_goal(owner, &NewGoal::new(title, target, deadline))?;
        info!(
            "event=goal_create module=goal status=ok id={} target={}",
            goal.id, goal.target
        );
        self.publisher
            .publish(owner, Collection::Goals, ChangeKind::Created, Some(goal.id));
        Ok(Some(goal))
    }

    /// Stores an explicit progress value. Values above target are kept.
    pub fn update_progress(
        &self,
        session: &Session,
        id: GoalId,
        current: i64,
    ) -> ServiceResult<Option<Goal>> {
        let Some(owner) = session_owner(session, "goal_progress") else {
            return Ok(None);
        };

        let goal = self.repo.update_progress(owner, id, current)?;
        if goal.current != current {
            return Err(ServiceError::Inconsistent("goal progress not persisted"));
        }
        info!(
            "event=goal_progress module=goal status=ok id={} current={} complete={}",
            id,
            goal.current,
            goal.is_complete()
        );
        self.publisher
            .publish(owner, Collection::Goals, ChangeKind::Updated, Some(id));
        Ok(Some(goal))
    }

    pub fn get_goal(&self, session: &Session, id: GoalId) -> ServiceResult<Option<Goal>> {
        let Some(owner) = session_owner(session, "goal_get") else {
            return Ok(None);
        };
        Ok(self.repo.get_goal(owner, id)?)
    }

    /// Goals, newest first.
    pub fn list_goals(&self, session: &Session) -> ServiceResult<Vec<Goal>> {
        let Some(owner) = session_owner(session, "goal_list") else {
            return Ok(Vec::new());
        };
        Ok(self.repo.list_goals(owner)?)
    }

    pub fn delete(&self, session: &Session, id: GoalId) -> ServiceResult<()> {
        let Some(owner) = session_owner(session, "goal_delete") else {
            return Ok(());
        };

        self.repo.delete_goal(owner, id)?;
        info!("event=goal_delete module=goal status=ok id={}", id);
        self.publisher
            .publish(owner, Collection::Goals, ChangeKind::Deleted, Some(id));
        Ok(())
    }
}
