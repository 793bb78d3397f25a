//! Cashflow repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `amount` is persisted in minor units exactly as validated by `NewStat`.
//! - Stats are read with a pull-once query; there is no live feed for them.

use crate::model::owner::OwnerId;
use crate::model::stat::{NewStat, Stat, StatKind};
use crate::repo::{now_millis, parse_owner, parse_uuid, RepoError, RepoResult};
use crate::window::TimeWindow;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

/// Repository interface for cashflow stats.
pub trait StatRepository {
    fn create_stat(&self, owner: &OwnerId, stat: &NewStat) -> RepoResult<Stat>;
    /// Stats in the inclusive window (all when `None`), ordered by date.
    fn list_stats(&self, owner: &OwnerId, window: Option<TimeWindow>) -> RepoResult<Vec<Stat>>;
}

/// SQLite-backed stat repository.
pub struct SqliteStatRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStatRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl StatRepository for SqliteStatRepository<'_> {
    fn create_stat(&self, owner: &OwnerId, stat: &NewStat) -> RepoResult<Stat> {
        if stat.amount <= 0 {
            return Err(RepoError::InvalidData(format!(
                "stat amount must be > 0 minor units, got {}",
                stat.amount
            )));
        }

        let now = now_millis();
        self.conn.execute(
            "INSERT INTO stats (id, owner_id, amount, date, type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                stat.id.to_string(),
                owner.as_str(),
                stat.amount,
                stat.date,
                stat.kind.as_str(),
                now,
            ],
        )?;

        Ok(Stat {
            id: stat.id,
            owner_id: owner.clone(),
            amount: stat.amount,
            date: stat.date,
            kind: stat.kind,
            created_at: now,
        })
    }

    fn list_stats(&self, owner: &OwnerId, window: Option<TimeWindow>) -> RepoResult<Vec<Stat>> {
        let mut sql = String::from(
            "SELECT id, owner_id, amount, date, type, created_at
             FROM stats
             WHERE owner_id = ?",
        );
        let mut bind_values: Vec<Value> = vec![Value::Text(owner.as_str().to_string())];
        if let Some(window) = window {
            sql.push_str(" AND date >= ? AND date <= ?");
            bind_values.push(Value::Integer(window.start));
            bind_values.push(Value::Integer(window.end));
        }
        sql.push_str(" ORDER BY date ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut stats = Vec::new();
        while let Some(row) = rows.next()? {
            stats.push(parse_stat_row(row)?);
        }
        Ok(stats)
    }
}

fn parse_stat_row(row: &Row<'_>) -> RepoResult<Stat> {
    let id_text: String = row.get("id")?;
    let owner_text: String = row.get("owner_id")?;
    let kind_text: String = row.get("type")?;
    let kind = StatKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid stat type `{kind_text}` in stats.type"))
    })?;
    Ok(Stat {
        id: parse_uuid(&id_text, "stats.id")?,
        owner_id: parse_owner(&owner_text, "stats.owner_id")?,
        amount: row.get("amount")?,
        date: row.get("date")?,
        kind,
        created_at: row.get("created_at")?,
    })
}
