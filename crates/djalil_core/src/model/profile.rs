//! Gamification profile: xp, level and rank.
//!
//! # Responsibility
//! - Map xp to level and level to rank.
//! - Detect drift between stored xp and its denormalized level/rank.
//!
//! # Invariants
//! - `level = min(floor(xp / 1000) + 1, 12)` and `rank = RANKS[level - 1]`.
//! - Level and rank are never set independently of xp.
//! - xp is floored at 0, so level always lies in `1..=12`.

use crate::model::owner::OwnerId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub const XP_PER_LEVEL: i64 = 1000;
pub const MAX_LEVEL: u8 = 12;

/// Ordered rank ladder, one rank per level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "Recrue")]
    Recrue,
    #[serde(rename = "Éclaireur")]
    Eclaireur,
    #[serde(rename = "Soldat")]
    Soldat,
    #[serde(rename = "Caporal")]
    Caporal,
    #[serde(rename = "Sergent")]
    Sergent,
    #[serde(rename = "Lieutenant")]
    Lieutenant,
    #[serde(rename = "Capitaine")]
    Capitaine,
    #[serde(rename = "Commandant")]
    Commandant,
    #[serde(rename = "Colonel")]
    Colonel,
    #[serde(rename = "Général")]
    General,
    #[serde(rename = "Warlord")]
    Warlord,
    #[serde(rename = "Empereur")]
    Empereur,
}

pub const RANKS: [Rank; MAX_LEVEL as usize] = [
    Rank::Recrue,
    Rank::Eclaireur,
    Rank::Soldat,
    Rank::Caporal,
    Rank::Sergent,
    Rank::Lieutenant,
    Rank::Capitaine,
    Rank::Commandant,
    Rank::Colonel,
    Rank::General,
    Rank::Warlord,
    Rank::Empereur,
];

impl Rank {
    /// Display and storage label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Recrue => "Recrue",
            Self::Eclaireur => "Éclaireur",
            Self::Soldat => "Soldat",
            Self::Caporal => "Caporal",
            Self::Sergent => "Sergent",
            Self::Lieutenant => "Lieutenant",
            Self::Capitaine => "Capitaine",
            Self::Commandant => "Commandant",
            Self::Colonel => "Colonel",
            Self::General => "Général",
            Self::Warlord => "Warlord",
            Self::Empereur => "Empereur",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        RANKS.iter().copied().find(|rank| rank.label() == value)
    }

    /// Rank for a level; levels outside `1..=12` are clamped first.
    pub fn for_level(level: u8) -> Self {
        let index = level.clamp(1, MAX_LEVEL) - 1;
        RANKS[usize::from(index)]
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Level for an xp total, capped at [`MAX_LEVEL`]. Negative xp maps to 1.
pub fn level_for_xp(xp: i64) -> u8 {
    let xp = xp.max(0);
    let level = (xp / XP_PER_LEVEL).saturating_add(1);
    // bounded by MAX_LEVEL before narrowing
    level.min(i64::from(MAX_LEVEL)) as u8
}

/// Stored level/rank disagree with what the stored xp implies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "profile drift: xp {xp} implies level {expected_level}/{expected_rank}, stored {stored_level}/{stored_rank}"
)]
pub struct ProfileDriftError {
    pub xp: i64,
    pub expected_level: u8,
    pub expected_rank: Rank,
    pub stored_level: i64,
    pub stored_rank: Rank,
}

/// Per-owner gamification state.
///
/// Deserialization goes through [`Profile::from_stored`], so level and rank
/// always agree with xp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredProfile")]
pub struct Profile {
    pub owner_id: OwnerId,
    pub xp: i64,
    pub level: u8,
    pub rank: Rank,
}

#[derive(Deserialize)]
struct StoredProfile {
    owner_id: OwnerId,
    xp: i64,
    level: i64,
    rank: Rank,
}

impl TryFrom<StoredProfile> for Profile {
    type Error = ProfileDriftError;

    fn try_from(stored: StoredProfile) -> Result<Self, Self::Error> {
        Self::from_stored(stored.owner_id, stored.xp, stored.level, stored.rank)
    }
}

impl Profile {
    /// Fresh profile: 0 xp, level 1, first rank.
    pub fn initial(owner_id: OwnerId) -> Self {
        Self::from_xp(owner_id, 0)
    }

    /// Derives level and rank from xp. xp below 0 is floored to 0.
    pub fn from_xp(owner_id: OwnerId, xp: i64) -> Self {
        let xp = xp.max(0);
        let level = level_for_xp(xp);
        Self {
            owner_id,
            xp,
            level,
            rank: Rank::for_level(level),
        }
    }

    /// Rebuilds a profile from stored columns, rejecting drift.
    pub fn from_stored(
        owner_id: OwnerId,
        xp: i64,
        stored_level: i64,
        stored_rank: Rank,
    ) -> Result<Self, ProfileDriftError> {
        let expected = Self::from_xp(owner_id, xp);
        if expected.xp != xp
            || i64::from(expected.level) != stored_level
            || expected.rank != stored_rank
        {
            return Err(ProfileDriftError {
                xp,
                expected_level: expected.level,
                expected_rank: expected.rank,
                stored_level,
                stored_rank,
            });
        }
        Ok(expected)
    }

    /// Xp threshold displayed as the next-level goal.
    pub fn xp_for_next_level(&self) -> i64 {
        i64::from(self.level) * XP_PER_LEVEL
    }

    /// Percentage of the current 1000-xp band already earned.
    pub fn xp_progress(&self) -> f64 {
        (self.xp.rem_euclid(XP_PER_LEVEL)) as f64 / XP_PER_LEVEL as f64 * 100.0
    }
}
