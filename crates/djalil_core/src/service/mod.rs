//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Resolve the session owner and treat an absent owner as a no-op.
//! - Publish committed writes to an optional change hub.
//!
//! # Invariants
//! - Services never bypass repository validation.
//! - Without an owner, reads return empty results and writes do nothing.

pub mod dashboard_service;
pub mod goal_service;
pub mod journal_service;
pub mod profile_service;
pub mod stat_service;
pub mod task_service;

use crate::live::{ChangeHub, ChangeKind, Collection};
use crate::model::owner::OwnerId;
use crate::repo::RepoError;
use crate::session::Session;
use log::debug;
use thiserror::Error;
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error shared by all use-cases.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller input rejected by validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Target record does not exist for this owner.
    #[error("record not found: {0}")]
    NotFound(Uuid),
    /// Persistence-layer failure.
    #[error(transparent)]
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    #[error("inconsistent state: {0}")]
    Inconsistent(&'static str),
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::TaskValidation(err) => Self::InvalidInput(err.to_string()),
            RepoError::GoalValidation(err) => Self::InvalidInput(err.to_string()),
            RepoError::StatValidation(err) => Self::InvalidInput(err.to_string()),
            RepoError::JournalValidation(err) => Self::InvalidInput(err.to_string()),
            other => Self::Repo(other),
        }
    }
}

/// Returns the session owner, logging a skipped event when absent.
pub(crate) fn session_owner<'s>(session: &'s Session, event: &str) -> Option<&'s OwnerId> {
    let owner = session.owner();
    if owner.is_none() {
        debug!("event={event} module=service status=skipped reason=no_owner");
    }
    owner
}

/// Optional hub publisher shared by services.
#[derive(Clone, Default)]
pub(crate) struct Publisher {
    hub: Option<ChangeHub>,
}

impl Publisher {
    pub(crate) fn new(hub: Option<ChangeHub>) -> Self {
        Self { hub }
    }

    pub(crate) fn publish(
        &self,
        owner: &OwnerId,
        collection: Collection,
        kind: ChangeKind,
        id: Option<Uuid>,
    ) {
        if let Some(hub) = &self.hub {
            hub.publish(owner, collection, kind, id);
        }
    }
}
