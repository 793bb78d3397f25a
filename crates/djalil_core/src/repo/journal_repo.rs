//! Journal repository contracts and SQLite implementation.

use crate::model::journal::{validate_content, JournalEntry, JournalEntryId};
use crate::model::owner::OwnerId;
use crate::repo::{now_millis, parse_owner, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const ENTRY_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    content,
    created_at,
    updated_at
FROM journal_entries";

/// Repository interface for journal entries.
pub trait JournalRepository {
    fn create_entry(
        &self,
        owner: &OwnerId,
        id: JournalEntryId,
        content: &str,
    ) -> RepoResult<JournalEntry>;
    fn get_entry(&self, owner: &OwnerId, id: JournalEntryId) -> RepoResult<Option<JournalEntry>>;
    /// Newest first.
    fn list_entries(&self, owner: &OwnerId) -> RepoResult<Vec<JournalEntry>>;
    fn delete_entry(&self, owner: &OwnerId, id: JournalEntryId) -> RepoResult<()>;
}

/// SQLite-backed journal repository.
pub struct SqliteJournalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteJournalRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl JournalRepository for SqliteJournalRepository<'_> {
    fn create_entry(
        &self,
        owner: &OwnerId,
        id: JournalEntryId,
        content: &str,
    ) -> RepoResult<JournalEntry> {
        validate_content(content)?;

        let now = now_millis();
        self.conn.execute(
            "INSERT INTO journal_entries (id, owner_id, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4);",
            params![id.to_string(), owner.as_str(), content, now],
        )?;

        Ok(JournalEntry {
            id,
            owner_id: owner.clone(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    fn get_entry(&self, owner: &OwnerId, id: JournalEntryId) -> RepoResult<Option<JournalEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENTRY_SELECT_SQL}
             WHERE id = ?1 AND owner_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), owner.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_entry_row(row)?));
        }
        Ok(None)
    }

    fn list_entries(&self, owner: &OwnerId) -> RepoResult<Vec<JournalEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENTRY_SELECT_SQL}
             WHERE owner_id = ?1
             ORDER BY created_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([owner.as_str()])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn delete_entry(&self, owner: &OwnerId, id: JournalEntryId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM journal_entries WHERE id = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<JournalEntry> {
    let id_text: String = row.get("id")?;
    let owner_text: String = row.get("owner_id")?;
    Ok(JournalEntry {
        id: parse_uuid(&id_text, "journal_entries.id")?,
        owner_id: parse_owner(&owner_text, "journal_entries.owner_id")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
