//! Core domain logic for Djalil OS.
//! This crate is the single source of truth for scheduling, scoring and
//! progression rules; adapters only translate.

pub mod config;
pub mod db;
pub mod live;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod scoring;
pub mod service;
pub mod session;
pub mod window;

pub use config::CoreConfig;
pub use db::{open_db, open_db_in_memory, DbError};
pub use live::{ChangeHub, ChangeKind, Collection, RecordChange, Subscription};
pub use logging::{default_log_level, init_logging, init_logging_from, logging_status};
pub use model::goal::{Goal, GoalId, NewGoal};
pub use model::journal::{JournalEntry, JournalEntryId};
pub use model::owner::OwnerId;
pub use model::profile::{Profile, Rank};
pub use model::stat::{CashflowSummary, Stat, StatKind};
pub use model::task::{Frequency, NewTask, Recurrence, Task, TaskId, TaskType, WeekdaySet};
pub use repo::goal_repo::{GoalRepository, SqliteGoalRepository};
pub use repo::journal_repo::{JournalRepository, SqliteJournalRepository};
pub use repo::profile_repo::{ProfileRepository, SqliteProfileRepository};
pub use repo::stat_repo::{SqliteStatRepository, StatRepository};
pub use repo::task_repo::{CompletionChange, SqliteTaskRepository, TaskListQuery, TaskRepository};
pub use repo::{RepoError, RepoResult};
pub use scoring::{protocol_score, tactical_score, XpChange};
pub use service::dashboard_service::{Dashboard, DashboardService, GoalCard};
pub use service::goal_service::GoalService;
pub use service::journal_service::JournalService;
pub use service::profile_service::{ProfileService, ProfileView};
pub use service::stat_service::StatService;
pub use service::task_service::TaskService;
pub use service::{ServiceError, ServiceResult};
pub use session::Session;
pub use window::{window, TimeWindow, WindowMode};

/// Minimal health-check API for adapters.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
