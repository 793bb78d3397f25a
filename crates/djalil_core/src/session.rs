//! Auth boundary as seen by core services.
//!
//! # Invariants
//! - Only owner presence drives behavior; `loading` is carried for callers.

use crate::model::owner::OwnerId;

/// Authentication snapshot handed to services.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    owner: Option<OwnerId>,
    /// True while the auth provider is still resolving.
    pub loading: bool,
}

impl Session {
    pub fn signed_in(owner: OwnerId) -> Self {
        Self {
            owner: Some(owner),
            loading: false,
        }
    }

    /// Session without an owner. Services treat it as a no-op.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session still resolving auth state.
    pub fn loading() -> Self {
        Self {
            owner: None,
            loading: true,
        }
    }

    /// Builds a session from raw owner text, blank text meaning anonymous.
    pub fn from_raw(owner: Option<&str>) -> Self {
        match owner.and_then(OwnerId::parse) {
            Some(owner) => Self::signed_in(owner),
            None => Self::anonymous(),
        }
    }

    pub fn owner(&self) -> Option<&OwnerId> {
        self.owner.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.owner.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::Session;

    #[test]
    fn blank_raw_owner_is_anonymous() {
        assert!(!Session::from_raw(Some("   ")).is_signed_in());
        assert!(!Session::from_raw(None).is_signed_in());
    }

    #[test]
    fn raw_owner_is_trimmed() {
        let session = Session::from_raw(Some(" uid-7 "));
        assert_eq!(session.owner().map(|owner| owner.as_str()), Some("uid-7"));
        assert!(!session.loading);
    }

    #[test]
    fn loading_session_has_no_owner() {
        let session = Session::loading();
        assert!(session.loading);
        assert!(session.owner().is_none());
    }
}
