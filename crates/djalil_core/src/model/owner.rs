//! Owner identity shared by every record kind.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Authenticated account identifier supplied by the auth boundary.
///
/// Always trimmed and non-blank.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

impl OwnerId {
    /// Parses an owner id, returning `None` for blank input.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OwnerId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value.as_str()).ok_or_else(|| "owner id must not be blank".to_string())
    }
}

impl From<OwnerId> for String {
    fn from(value: OwnerId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::OwnerId;

    #[test]
    fn parse_trims_and_rejects_blank() {
        assert_eq!(OwnerId::parse("  uid-1 ").unwrap().as_str(), "uid-1");
        assert!(OwnerId::parse("   ").is_none());
    }
}
