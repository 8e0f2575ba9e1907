use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use strum::{Display, EnumIter};
use thiserror::Error;

/// The elevation class of a single grid cell. Caves have exactly four
/// levels; tier 0 is the cave floor (and the solid border around the map),
/// and each tier above it is raised by one wall height.
///
/// Serialized as its numeric level.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    EnumIter,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
#[strum(serialize_all = "snake_case")]
pub enum Tier {
    Floor,
    Low,
    Mid,
    High,
}

/// Error for converting an out-of-range integer into a [Tier]
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
#[error("tier level out of range (expected 0-3): {0}")]
pub struct InvalidTier(pub u8);

impl Tier {
    /// All tiers, lowest to highest
    pub const ALL: [Self; 4] = [Self::Floor, Self::Low, Self::Mid, Self::High];

    /// Numeric level of this tier, 0-3
    pub fn level(self) -> u8 {
        self as u8
    }

    /// Index of this tier, for use in per-tier arrays
    pub fn index(self) -> usize {
        self as usize
    }

    /// The tier one level up, if there is one
    pub fn raised(self) -> Option<Self> {
        Self::try_from(self.level() + 1).ok()
    }

    /// The tier one level down, if there is one
    pub fn lowered(self) -> Option<Self> {
        self.level()
            .checked_sub(1)
            .and_then(|level| Self::try_from(level).ok())
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier.level()
    }
}

impl TryFrom<u8> for Tier {
    type Error = InvalidTier;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Self::Floor),
            1 => Ok(Self::Low),
            2 => Ok(Self::Mid),
            3 => Ok(Self::High),
            _ => Err(InvalidTier(level)),
        }
    }
}
