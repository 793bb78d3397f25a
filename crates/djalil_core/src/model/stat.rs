//! Cashflow records stored in minor currency units.
//!
//! # Invariants
//! - Stored amount is `round(input * 100)`.
//! - Aggregates sum integer minor units and convert back by dividing by 100.

use crate::model::owner::OwnerId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub type StatId = Uuid;

const MINOR_UNITS_PER_MAJOR: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Income,
    Expense,
}

impl StatKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum StatValidationError {
    #[error("amount must be a finite number, got {0}")]
    NotFinite(f64),
    #[error("amount must be > 0, got {0}")]
    NonPositive(f64),
    #[error("amount {0} is too large to store")]
    OutOfRange(f64),
}

/// One income or expense entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub id: StatId,
    pub owner_id: OwnerId,
    /// Minor units (cents).
    pub amount: i64,
    pub date: i64,
    #[serde(rename = "type")]
    pub kind: StatKind,
    pub created_at: i64,
}

impl Stat {
    /// Amount in major units.
    pub fn major_amount(&self) -> f64 {
        to_major_units(self.amount)
    }
}

/// Converts a user-entered major amount to stored minor units.
pub fn to_minor_units(amount: f64) -> Result<i64, StatValidationError> {
    if !amount.is_finite() {
        return Err(StatValidationError::NotFinite(amount));
    }
    if amount <= 0.0 {
        return Err(StatValidationError::NonPositive(amount));
    }
    let minor = (amount * MINOR_UNITS_PER_MAJOR).round();
    // rounds to zero cents
    if minor < 1.0 {
        return Err(StatValidationError::NonPositive(amount));
    }
    if minor >= i64::MAX as f64 {
        return Err(StatValidationError::OutOfRange(amount));
    }
    Ok(minor as i64)
}

pub fn to_major_units(minor: i64) -> f64 {
    minor as f64 / MINOR_UNITS_PER_MAJOR
}

/// Creation request for a cashflow entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStat {
    pub id: StatId,
    /// Minor units (cents).
    pub amount: i64,
    pub kind: StatKind,
    pub date: i64,
}

impl NewStat {
    /// Builds a request from a major-unit amount, rounding to minor units.
    pub fn from_major(amount: f64, kind: StatKind, date: i64) -> Result<Self, StatValidationError> {
        Ok(Self {
            id: Uuid::new_v4(),
            amount: to_minor_units(amount)?,
            kind,
            date,
        })
    }
}

/// Income, expense and net over a set of stats, in major units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CashflowSummary {
    pub income: f64,
    pub expense: f64,
    pub net: f64,
}

impl CashflowSummary {
    pub fn from_stats<'a>(stats: impl IntoIterator<Item = &'a Stat>) -> Self {
        let (mut income, mut expense) = (0_i64, 0_i64);
        for stat in stats {
            match stat.kind {
                StatKind::Income => income = income.saturating_add(stat.amount),
                StatKind::Expense => expense = expense.saturating_add(stat.amount),
            }
        }
        Self {
            income: to_major_units(income),
            expense: to_major_units(expense),
            net: to_major_units(income.saturating_sub(expense)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{to_minor_units, CashflowSummary, Stat, StatKind, StatValidationError};
    use crate::model::owner::OwnerId;
    use uuid::Uuid;

    fn stat(amount: i64, kind: StatKind) -> Stat {
        Stat {
            id: Uuid::new_v4(),
            owner_id: OwnerId::parse("owner").unwrap(),
            amount,
            date: 0,
            kind,
            created_at: 0,
        }
    }

    #[test]
    fn minor_units_round_to_nearest_cent() {
        assert_eq!(to_minor_units(19.999).unwrap(), 2000);
        assert_eq!(to_minor_units(0.5).unwrap(), 50);
        assert_eq!(to_minor_units(12.34).unwrap(), 1234);
    }

    #[test]
    fn minor_units_reject_invalid_input() {
        assert!(matches!(
            to_minor_units(f64::NAN),
            Err(StatValidationError::NotFinite(_))
        ));
        assert_eq!(
            to_minor_units(-1.0).unwrap_err(),
            StatValidationError::NonPositive(-1.0)
        );
        assert_eq!(
            to_minor_units(0.0).unwrap_err(),
            StatValidationError::NonPositive(0.0)
        );
    }

    #[test]
    fn summary_converts_back_to_major_units() {
        let stats = vec![
            stat(to_minor_units(19.999).unwrap(), StatKind::Income),
            stat(500, StatKind::Income),
            stat(250, StatKind::Expense),
        ];
        let summary = CashflowSummary::from_stats(&stats);
        assert_eq!(summary.income, 25.0);
        assert_eq!(summary.expense, 2.5);
        assert_eq!(summary.net, 22.5);

        let single = CashflowSummary::from_stats(&stats[..1]);
        assert_eq!(single.income, 20.0);
    }
}
