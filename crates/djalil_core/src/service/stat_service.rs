//! Cashflow use-case service.
//!
//! # Invariants
//! - Amounts enter as major units and are stored as rounded minor units.
//! - Summaries sum minor units before converting back.

use crate::live::{ChangeHub, ChangeKind, Collection};
use crate::model::stat::{CashflowSummary, NewStat, Stat, StatKind};
use crate::repo::now_millis;
use crate::repo::stat_repo::StatRepository;
use crate::service::{session_owner, Publisher, ServiceError, ServiceResult};
use crate::session::Session;
use crate::window::{window, WindowMode};
use chrono::{DateTime, TimeZone};
use log::info;

/// Use-case service for income/expense records.
pub struct StatService<R: StatRepository> {
    repo: R,
    publisher: Publisher,
}

impl<R: StatRepository> StatService<R> {
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

    /// Records an amount dated now.
    pub fn record(
        &self,
        session: &Session,
        amount: f64,
        kind: StatKind,
    ) -> ServiceResult<Option<Stat>> {
        self.record_at(session, amount, kind, now_millis())
    }

    /// Records an amount at an explicit instant (epoch milliseconds).
    pub fn record_at(
        &self,
        session: &Session,
        amount: f64,
        kind: StatKind,
        date: i64,
    ) -> ServiceResult<Option<Stat>> {
        let Some(owner) = session_owner(session, "stat_create") else {
            return Ok(None);
        };

        let request = NewStat::from_major(amount, kind, date)
            .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;
        let stat = self.repo.create_stat(owner, &request)?;
        info!(
            "event=stat_create module=stat status=ok id={} type={} minor={}",
            stat.id,
            stat.kind.as_str(),
            stat.amount
        );
        self.publisher
            .publish(owner, Collection::Stats, ChangeKind::Created, Some(stat.id));
        Ok(Some(stat))
    }

    /// Stats in the window around `now`, ordered by date.
    pub fn list<Tz: TimeZone>(
        &self,
        session: &Session,
        mode: WindowMode,
        now: &DateTime<Tz>,
    ) -> ServiceResult<Vec<Stat>> {
        let Some(owner) = session_owner(session, "stat_list") else {
            return Ok(Vec::new());
        };
        Ok(self.repo.list_stats(owner, Some(window(mode, now)))?)
    }

    /// Income, expense and net for the window around `now`.
    pub fn summary<Tz: TimeZone>(
        &self,
        session: &Session,
        mode: WindowMode,
        now: &DateTime<Tz>,
    ) -> ServiceResult<CashflowSummary> {
        let stats = self.list(session, mode, now)?;
        Ok(CashflowSummary::from_stats(&stats))
    }
}
