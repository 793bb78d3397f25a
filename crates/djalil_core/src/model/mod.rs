//! Domain records for tasks, goals, profile, cashflow and journal.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Enforce write-boundary validation rules on each record kind.
//!
//! # Invariants
//! - Every record is exclusively owned by one `OwnerId`.
//! - Instants are Unix epoch milliseconds.
//! - Task type is derived from recurrence, never stored independently.

pub mod goal;
pub mod journal;
pub mod owner;
pub mod profile;
pub mod stat;
pub mod task;
