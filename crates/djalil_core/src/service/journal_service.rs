//! Journal use-case service.
//!
//! Entry content is never logged; events carry ids and lengths only.

use crate::live::{ChangeHub, ChangeKind, Collection};
use crate::model::journal::{JournalEntry, JournalEntryId};
use crate::repo::journal_repo::JournalRepository;
use crate::service::{session_owner, Publisher, ServiceResult};
use crate::session::Session;
use log::info;
use uuid::Uuid;

/// Use-case service for journal entries.
pub struct JournalService<R: JournalRepository> {
    repo: R,
    publisher: Publisher,
}

impl<R: JournalRepository> JournalService<R> {
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

    pub fn add_entry(&self, session: &Session, content: &str) -> ServiceResult<Option<JournalEntry>> {
        let Some(owner) = session_owner(session, "journal_create") else {
            return Ok(None);
        };

        let entry = self.repo.create_entry(owner, Uuid::new_v4(), content)?;
        info!(
            "event=journal_create module=journal status=ok id={} chars={}",
            entry.id,
            entry.content.chars().count()
        );
        self.publisher
            .publish(owner, Collection::Journal, ChangeKind::Created, Some(entry.id));
        Ok(Some(entry))
    }

    pub fn get_entry(
        &self,
        session: &Session,
        id: JournalEntryId,
    ) -> ServiceResult<Option<JournalEntry>> {
        let Some(owner) = session_owner(session, "journal_get") else {
            return Ok(None);
        };
        Ok(self.repo.get_entry(owner, id)?)
    }

    /// Entries, newest first.
    pub fn list_entries(&self, session: &Session) -> ServiceResult<Vec<JournalEntry>> {
        let Some(owner) = session_owner(session, "journal_list") else {
            return Ok(Vec::new());
        };
        Ok(self.repo.list_entries(owner)?)
    }

    pub fn delete(&self, session: &Session, id: JournalEntryId) -> ServiceResult<()> {
        let Some(owner) = session_owner(session, "journal_delete") else {
            return Ok(());
        };

        self.repo.delete_entry(owner, id)?;
        info!("event=journal_delete module=journal status=ok id={}", id);
        self.publisher
            .publish(owner, Collection::Journal, ChangeKind::Deleted, Some(id));
        Ok(())
    }
}
