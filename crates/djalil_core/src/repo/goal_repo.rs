//! Goal repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Goals list newest first (`created_at DESC`, insertion order on ties).
//! - Progress updates store the caller's value verbatim after validation.

use crate::model::goal::{validate_current, Goal, GoalId, NewGoal};
use crate::model::owner::OwnerId;
use crate::repo::{now_millis, parse_owner, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const GOAL_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    title,
    target,
    current,
    deadline,
    created_at,
    updated_at
FROM goals";

/// Repository interface for goals.
pub trait GoalRepository {
    fn create_goal(&self, owner: &OwnerId, goal: &NewGoal) -> RepoResult<Goal>;
    fn get_goal(&self, owner: &OwnerId, id: GoalId) -> RepoResult<Option<Goal>>;
    fn list_goals(&self, owner: &OwnerId) -> RepoResult<Vec<Goal>>;
    fn update_progress(&self, owner: &OwnerId, id: GoalId, current: i64) -> RepoResult<Goal>;
    fn delete_goal(&self, owner: &OwnerId, id: GoalId) -> RepoResult<()>;
}

/// SQLite-backed goal repository.
pub struct SqliteGoalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGoalRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl GoalRepository for SqliteGoalRepository<'_> {
    fn create_goal(&self, owner: &OwnerId, goal: &NewGoal) -> RepoResult<Goal> {
        goal.validate()?;

        let now = now_millis();
        self.conn.execute(
            "INSERT INTO goals (id, owner_id, title, target, current, deadline, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?6);",
            params![
                goal.id.to_string(),
                owner.as_str(),
                goal.title.as_str(),
                goal.target,
                goal.deadline,
                now,
            ],
        )?;

        Ok(Goal {
            id: goal.id,
            owner_id: owner.clone(),
            title: goal.title.clone(),
            target: goal.target,
            current: 0,
            deadline: goal.deadline,
            created_at: now,
            updated_at: now,
        })
    }

    fn get_goal(&self, owner: &OwnerId, id: GoalId) -> RepoResult<Option<Goal>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GOAL_SELECT_SQL}
             WHERE id = ?1 AND owner_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), owner.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_goal_row(row)?));
        }
        Ok(None)
    }

    fn list_goals(&self, owner: &OwnerId) -> RepoResult<Vec<Goal>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GOAL_SELECT_SQL}
             WHERE owner_id = ?1
             ORDER BY created_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([owner.as_str()])?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next()? {
            goals.push(parse_goal_row(row)?);
        }
        Ok(goals)
    }

    fn update_progress(&self, owner: &OwnerId, id: GoalId, current: i64) -> RepoResult<Goal> {
        validate_current(current)?;

        let changed = self.conn.execute(
            "UPDATE goals
             SET current = ?3, updated_at = ?4
             WHERE id = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner.as_str(), current, now_millis()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        self.get_goal(owner, id)?.ok_or(RepoError::NotFound(id))
    }

    fn delete_goal(&self, owner: &OwnerId, id: GoalId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM goals WHERE id = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_goal_row(row: &Row<'_>) -> RepoResult<Goal> {
    let id_text: String = row.get("id")?;
    let owner_text: String = row.get("owner_id")?;
    Ok(Goal {
        id: parse_uuid(&id_text, "goals.id")?,
        owner_id: parse_owner(&owner_text, "goals.owner_id")?,
        title: row.get("title")?,
        target: row.get("target")?,
        current: row.get("current")?,
        deadline: row.get("deadline")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
