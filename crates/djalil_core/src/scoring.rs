//! Completion scores and xp transitions derived from tasks and profiles.
//!
//! # Invariants
//! - Scores are integer percentages in `0..=100`; an empty subset scores 0.
//! - An xp transition recomputes level and rank together from the new xp.

use crate::model::profile::Profile;
use crate::model::task::{Task, TaskType};
use serde::Serialize;

/// Xp granted for completing a task and revoked when it is uncompleted.
pub const XP_PER_TASK: i64 = 50;

/// `round(100 * completed / total)` over tasks of `kind`, 0 when none.
pub fn completion_score(tasks: &[Task], kind: TaskType) -> u8 {
    let (total, completed) = tasks
        .iter()
        .filter(|task| task.kind() == kind)
        .fold((0_usize, 0_usize), |(total, completed), task| {
            (total + 1, completed + usize::from(task.completed))
        });
    percentage(completed, total)
}

pub fn protocol_score(tasks: &[Task]) -> u8 {
    completion_score(tasks, TaskType::Protocol)
}

/// Display-only counterpart of [`protocol_score`].
pub fn tactical_score(tasks: &[Task]) -> u8 {
    completion_score(tasks, TaskType::Tactical)
}

/// Splits tasks into `(protocol, tactical)` preserving order.
pub fn partition_by_kind(tasks: Vec<Task>) -> (Vec<Task>, Vec<Task>) {
    tasks.into_iter().partition(Task::is_protocol)
}

fn percentage(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = part as f64 / total as f64 * 100.0;
    // part <= total keeps the ratio within 0..=100
    ratio.round().clamp(0.0, 100.0) as u8
}

/// Result of applying an xp delta to a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XpChange {
    pub before: Profile,
    pub after: Profile,
    pub leveled_up: bool,
}

/// Adds `delta` xp and recomputes level and rank. xp never drops below 0.
pub fn apply_xp_delta(profile: &Profile, delta: i64) -> XpChange {
    let after = Profile::from_xp(profile.owner_id.clone(), profile.xp.saturating_add(delta));
    XpChange {
        leveled_up: after.level > profile.level,
        before: profile.clone(),
        after,
    }
}

/// Xp delta that accompanies a completion flip.
pub fn toggle_xp_delta(completed: bool) -> i64 {
    if completed {
        XP_PER_TASK
    } else {
        -XP_PER_TASK
    }
}
