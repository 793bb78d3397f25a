//! Goal domain model and progress rules.
//!
//! # Invariants
//! - `current` may exceed `target`; stored values are never clamped.
//! - Completion is `current >= target`.
//! - Display progress is clamped to `[0, 100]`.

use crate::model::owner::OwnerId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub type GoalId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GoalValidationError {
    #[error("goal title must not be blank")]
    BlankTitle,
    #[error("goal target must be > 0, got {0}")]
    NonPositiveTarget(i64),
    #[error("goal progress must be >= 0, got {0}")]
    NegativeProgress(i64),
}

/// Long-running objective with a numeric target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub owner_id: OwnerId,
    pub title: String,
    pub target: i64,
    pub current: i64,
    /// Optional deadline, epoch milliseconds.
    pub deadline: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Goal {
    /// Unclamped progress percentage; `0.0` when the target is not positive.
    pub fn progress(&self) -> f64 {
        progress_percent(self.current, self.target)
    }

    /// Progress clamped to `[0, 100]` for rendering.
    pub fn display_progress(&self) -> f64 {
        self.progress().clamp(0.0, 100.0)
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.target
    }
}

/// Computes `current / target * 100`, or `0.0` when `target <= 0`.
pub fn progress_percent(current: i64, target: i64) -> f64 {
    if target > 0 {
        current as f64 / target as f64 * 100.0
    } else {
        0.0
    }
}

/// Creation request for a goal. New goals start at zero progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGoal {
    pub id: GoalId,
    pub title: String,
    pub target: i64,
    pub deadline: Option<i64>,
}

impl NewGoal {
    pub fn new(title: impl Into<String>, target: i64, deadline: Option<i64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into().trim().to_string(),
            target,
            deadline,
        }
    }

    pub fn validate(&self) -> Result<(), GoalValidationError> {
        if self.title.trim().is_empty() {
            return Err(GoalValidationError::BlankTitle);
        }
        validate_target(self.target)
    }
}

pub fn validate_target(target: i64) -> Result<(), GoalValidationError> {
    if target <= 0 {
        return Err(GoalValidationError::NonPositiveTarget(target));
    }
    Ok(())
}

pub fn validate_current(current: i64) -> Result<(), GoalValidationError> {
    if current < 0 {
        return Err(GoalValidationError::NegativeProgress(current));
    }
    Ok(())
}
