//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define owner-scoped data access contracts per record kind.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Every query and mutation is filtered by `owner_id`.
//! - Write paths validate records before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::goal::GoalValidationError;
use crate::model::journal::JournalValidationError;
use crate::model::owner::OwnerId;
use crate::model::stat::StatValidationError;
use crate::model::task::TaskValidationError;
use thiserror::Error;
use uuid::Uuid;

pub mod goal_repo;
pub mod journal_repo;
pub mod profile_repo;
pub mod stat_repo;
pub mod task_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all record kinds.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0}")]
    TaskValidation(#[from] TaskValidationError),
    #[error("{0}")]
    GoalValidation(#[from] GoalValidationError),
    #[error("{0}")]
    StatValidation(#[from] StatValidationError),
    #[error("{0}")]
    JournalValidation(#[from] JournalValidationError),
    #[error("{0}")]
    Db(#[from] DbError),
    #[error("record not found: {0}")]
    NotFound(Uuid),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Current wall-clock instant in epoch milliseconds.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_owner(value: &str, column: &str) -> RepoResult<OwnerId> {
    OwnerId::parse(value)
        .ok_or_else(|| RepoError::InvalidData(format!("blank owner id in {column}")))
}

pub(crate) fn parse_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
