//! Gamification profile service.

use crate::live::{ChangeHub, ChangeKind, Collection};
use crate::model::profile::Profile;
use crate::repo::profile_repo::ProfileRepository;
use crate::scoring::XpChange;
use crate::service::{session_owner, Publisher, ServiceResult};
use crate::session::Session;
use log::info;
use serde::Serialize;

/// Profile plus the derived progress values shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileView {
    pub profile: Profile,
    pub xp_for_next_level: i64,
    /// Percent of the current 1000-xp band, `[0, 100)`.
    pub xp_progress: f64,
}

impl From<Profile> for ProfileView {
    fn from(profile: Profile) -> Self {
        Self {
            xp_for_next_level: profile.xp_for_next_level(),
            xp_progress: profile.xp_progress(),
            profile,
        }
    }
}

/// Use-case service for profiles.
pub struct ProfileService<R: ProfileRepository> {
    repo: R,
    publisher: Publisher,
}

impl<R: ProfileRepository> ProfileService<R> {
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

    /// Loads the profile, creating the initial one on first access.
    pub fn profile(&self, session: &Session) -> ServiceResult<Option<ProfileView>> {
        let Some(owner) = session_owner(session, "profile_load") else {
            return Ok(None);
        };
        Ok(Some(self.repo.ensure_profile(owner)?.into()))
    }

    /// Applies an arbitrary xp delta.
    pub fn add_xp(&self, session: &Session, delta: i64) -> ServiceResult<Option<XpChange>> {
        let Some(owner) = session_owner(session, "profile_xp") else {
            return Ok(None);
        };

        let change = self.repo.apply_xp(owner, delta)?;
        info!(
            "event=profile_xp module=profile status=ok delta={} xp={} level={} leveled_up={}",
            delta, change.after.xp, change.after.level, change.leveled_up
        );
        self.publisher
            .publish(owner, Collection::Profile, ChangeKind::Updated, None);
        Ok(Some(change))
    }
}
