//! Profile repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Lazily create and load the per-owner gamification profile.
//! - Persist xp transitions with level and rank recomputed together.
//!
//! # Invariants
//! - Stored level/rank are verified against stored xp on every read.
//! - Xp writes go through `scoring::apply_xp_delta`, never raw column updates.

use crate::model::owner::OwnerId;
use crate::model::profile::{Profile, Rank};
use crate::repo::{now_millis, parse_owner, RepoError, RepoResult};
use crate::scoring::{apply_xp_delta, XpChange};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

/// Repository interface for gamification profiles.
pub trait ProfileRepository {
    /// Loads a profile without creating one.
    fn get_profile(&self, owner: &OwnerId) -> RepoResult<Option<Profile>>;
    /// Loads a profile, creating the initial one on first access.
    fn ensure_profile(&self, owner: &OwnerId) -> RepoResult<Profile>;
    /// Applies an xp delta atomically and returns the transition.
    fn apply_xp(&self, owner: &OwnerId, delta: i64) -> RepoResult<XpChange>;
}

/// SQLite-backed profile repository.
pub struct SqliteProfileRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProfileRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProfileRepository for SqliteProfileRepository<'_> {
    fn get_profile(&self, owner: &OwnerId) -> RepoResult<Option<Profile>> {
        load_profile(self.conn, owner)
    }

    fn ensure_profile(&self, owner: &OwnerId) -> RepoResult<Profile> {
        load_or_create_profile(self.conn, owner)
    }

    fn apply_xp(&self, owner: &OwnerId, delta: i64) -> RepoResult<XpChange> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let change = apply_xp_in(&tx, owner, delta)?;
        tx.commit()?;
        Ok(change)
    }
}

/// Loads (or creates) the profile, applies `delta` and writes it back.
///
/// Callers own the surrounding transaction.
pub(crate) fn apply_xp_in(conn: &Connection, owner: &OwnerId, delta: i64) -> RepoResult<XpChange> {
    let before = load_or_create_profile(conn, owner)?;
    let change = apply_xp_delta(&before, delta);
    write_profile(conn, &change.after)?;
    Ok(change)
}

pub(crate) fn load_or_create_profile(conn: &Connection, owner: &OwnerId) -> RepoResult<Profile> {
    let initial = Profile::initial(owner.clone());
    let now = now_millis();
    conn.execute(
        "INSERT OR IGNORE INTO profiles (owner_id, xp, level, rank, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5);",
        params![
            owner.as_str(),
            initial.xp,
            i64::from(initial.level),
            initial.rank.label(),
            now,
        ],
    )?;

    load_profile(conn, owner)?.ok_or_else(|| {
        RepoError::InvalidData(format!("profile for owner `{owner}` missing after insert"))
    })
}

fn load_profile(conn: &Connection, owner: &OwnerId) -> RepoResult<Option<Profile>> {
    let mut stmt = conn.prepare(
        "SELECT owner_id, xp, level, rank
         FROM profiles
         WHERE owner_id = ?1;",
    )?;
    let mut rows = stmt.query([owner.as_str()])?;
    let Some(row) = rows.next()? else {
        return Ok(None);
    };

    let owner_text: String = row.get("owner_id")?;
    let owner_id = parse_owner(&owner_text, "profiles.owner_id")?;
    let rank_text: String = row.get("rank")?;
    let rank = Rank::parse(&rank_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid rank `{rank_text}` in profiles.rank"))
    })?;

    let profile = Profile::from_stored(owner_id, row.get("xp")?, row.get("level")?, rank)
        .map_err(|err| RepoError::InvalidData(err.to_string()))?;
    Ok(Some(profile))
}

fn write_profile(conn: &Connection, profile: &Profile) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE profiles
         SET xp = ?2, level = ?3, rank = ?4, updated_at = ?5
         WHERE owner_id = ?1;",
        params![
            profile.owner_id.as_str(),
            profile.xp,
            i64::from(profile.level),
            profile.rank.label(),
            now_millis(),
        ],
    )?;
    if changed == 0 {
        return Err(RepoError::InvalidData(format!(
            "profile for owner `{}` vanished during update",
            profile.owner_id
        )));
    }
    Ok(())
}
