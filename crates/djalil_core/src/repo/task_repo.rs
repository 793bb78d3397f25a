//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist protocol/tactical tasks with their recurrence columns.
//! - Run the completion flip and its xp adjustment as one transaction.
//!
//! # Invariants
//! - `type` is written from the recurrence and re-checked against
//!   `frequency` on read.
//! - `custom_days` is a JSON array text column, NULL for non-custom tasks.
//! - Listing is ordered by `date ASC, id ASC`.
//! - Toggling never modifies `id` or `date`.

use crate::model::owner::OwnerId;
use crate::model::task::{Frequency, NewTask, Recurrence, Task, TaskId, TaskType};
use crate::repo::profile_repo::apply_xp_in;
use crate::repo::{
    bool_to_int, now_millis, parse_bool, parse_owner, parse_uuid, RepoError, RepoResult,
};
use crate::scoring::{toggle_xp_delta, XpChange};
use crate::window::TimeWindow;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    title,
    type,
    completed,
    date,
    frequency,
    custom_days,
    created_at,
    updated_at
FROM tasks";

/// Query options for listing one owner's tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    /// Inclusive date range filter.
    pub window: Option<TimeWindow>,
    pub kind: Option<TaskType>,
}

/// Outcome of a completion toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionChange {
    /// Task state after the call.
    pub task: Task,
    /// Xp transition, `None` when the task already had the requested state.
    pub xp: Option<XpChange>,
}

/// Repository interface for task operations.
pub trait TaskRepository {
    fn create_task(&self, owner: &OwnerId, task: &NewTask) -> RepoResult<Task>;
    fn get_task(&self, owner: &OwnerId, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, owner: &OwnerId, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    /// Sets `completed` and adjusts profile xp by ±50 in one transaction.
    ///
    /// Setting the state the task already has changes nothing.
    fn set_completed(
        &self,
        owner: &OwnerId,
        id: TaskId,
        completed: bool,
    ) -> RepoResult<CompletionChange>;
    fn delete_task(&self, owner: &OwnerId, id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, owner: &OwnerId, task: &NewTask) -> RepoResult<Task> {
        task.validate()?;

        let now = now_millis();
        let custom_days = encode_custom_days(&task.recurrence)?;
        self.conn.execute(
            "INSERT INTO tasks (
                id,
                owner_id,
                title,
                type,
                completed,
                date,
                frequency,
                custom_days,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7, ?8, ?8);",
            params![
                task.id.to_string(),
                owner.as_str(),
                task.title.as_str(),
                task.recurrence.task_type().as_str(),
                task.date,
                task.recurrence.frequency().as_str(),
                custom_days,
                now,
            ],
        )?;

        Ok(Task {
            id: task.id,
            owner_id: owner.clone(),
            title: task.title.clone(),
            recurrence: task.recurrence.clone(),
            completed: false,
            date: task.date,
            created_at: now,
            updated_at: now,
        })
    }

    fn get_task(&self, owner: &OwnerId, id: TaskId) -> RepoResult<Option<Task>> {
        load_task(self.conn, owner, id)
    }

    fn list_tasks(&self, owner: &OwnerId, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE owner_id = ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(owner.as_str().to_string())];

        if let Some(window) = query.window {
            sql.push_str(" AND date >= ? AND date <= ?");
            bind_values.push(Value::Integer(window.start));
            bind_values.push(Value::Integer(window.end));
        }

        if let Some(kind) = query.kind {
            sql.push_str(" AND type = ?");
            bind_values.push(Value::Text(kind.as_str().to_string()));
        }

        sql.push_str(" ORDER BY date ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn set_completed(
        &self,
        owner: &OwnerId,
        id: TaskId,
        completed: bool,
    ) -> RepoResult<CompletionChange> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut task = load_task(&tx, owner, id)?.ok_or(RepoError::NotFound(id))?;

        if task.completed == completed {
            tx.commit()?;
            return Ok(CompletionChange { task, xp: None });
        }

        let now = now_millis();
        tx.execute(
            "UPDATE tasks
             SET completed = ?3, updated_at = ?4
             WHERE id = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner.as_str(), bool_to_int(completed), now],
        )?;
        let xp = apply_xp_in(&tx, owner, toggle_xp_delta(completed))?;
        tx.commit()?;

        task.completed = completed;
        task.updated_at = now;
        Ok(CompletionChange { task, xp: Some(xp) })
    }

    fn delete_task(&self, owner: &OwnerId, id: TaskId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM tasks WHERE id = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner.as_str()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn load_task(conn: &Connection, owner: &OwnerId, id: TaskId) -> RepoResult<Option<Task>> {
    let mut stmt = conn.prepare(&format!(
        "{TASK_SELECT_SQL}
         WHERE id = ?1 AND owner_id = ?2;"
    ))?;
    let mut rows = stmt.query(params![id.to_string(), owner.as_str()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_task_row(row)?));
    }
    Ok(None)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "tasks.id")?;
    let owner_text: String = row.get("owner_id")?;
    let owner_id = parse_owner(&owner_text, "tasks.owner_id")?;

    let type_text: String = row.get("type")?;
    let task_type = TaskType::parse(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid task type `{type_text}` in tasks.type"))
    })?;
    let frequency_text: String = row.get("frequency")?;
    let frequency = Frequency::parse(&frequency_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid frequency `{frequency_text}` in tasks.frequency"
        ))
    })?;
    let custom_days = decode_custom_days(row.get("custom_days")?)?;

    let recurrence = Recurrence::from_parts(frequency, custom_days)
        .and_then(|recurrence| recurrence.ensure_type(task_type).map(|()| recurrence))
        .map_err(|err| RepoError::InvalidData(format!("task {id}: {err}")))?;

    Ok(Task {
        id,
        owner_id,
        title: row.get("title")?,
        recurrence,
        completed: parse_bool(row.get("completed")?, "tasks.completed")?,
        date: row.get("date")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn encode_custom_days(recurrence: &Recurrence) -> RepoResult<Option<String>> {
    recurrence
        .custom_days()
        .map(|days| {
            serde_json::to_string(&days.to_vec())
                .map_err(|err| RepoError::InvalidData(format!("custom days encoding: {err}")))
        })
        .transpose()
}

fn decode_custom_days(raw: Option<String>) -> RepoResult<Option<Vec<u8>>> {
    match raw {
        None => Ok(None),
        Some(text) => serde_json::from_str::<Vec<u8>>(&text).map(Some).map_err(|_| {
            RepoError::InvalidData(format!("invalid day list `{text}` in tasks.custom_days"))
        }),
    }
}
