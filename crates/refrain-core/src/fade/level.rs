//! Fade level newtype

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How much of a chunk is concealed: 0 = everything visible, 5 = everything hidden.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct FadeLevel(u8);

impl FadeLevel {
    /// Fully visible (learning)
    pub const MIN: FadeLevel = FadeLevel(0);
    /// Fully concealed (mastery test)
    pub const MAX: FadeLevel = FadeLevel(5);

    /// Validate a level supplied by a caller.
    pub fn new(level: u8) -> Result<Self> {
        if level > Self::MAX.0 {
            return Err(Error::Validation(format!(
                "Fade level must be between 0 and 5, got {}",
                level
            )));
        }
        Ok(FadeLevel(level))
    }

    /// Sanitize a stored value. Out-of-range levels are pulled back into 0..=5.
    pub fn clamped(raw: i64) -> Self {
        FadeLevel(raw.clamp(0, Self::MAX.0 as i64) as u8)
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// One step harder, saturating at 5.
    pub fn raise(self) -> Self {
        FadeLevel((self.0 + 1).min(Self::MAX.0))
    }

    /// One step easier, saturating at 0.
    pub fn lower(self) -> Self {
        FadeLevel(self.0.saturating_sub(1))
    }

    #[inline]
    pub fn is_full_concealment(self) -> bool {
        self == Self::MAX
    }

    /// All levels in ascending order.
    pub fn all() -> impl Iterator<Item = FadeLevel> {
        (Self::MIN.0..=Self::MAX.0).map(FadeLevel)
    }
}

impl TryFrom<u8> for FadeLevel {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        FadeLevel::new(value)
    }
}

impl From<FadeLevel> for u8 {
    fn from(level: FadeLevel) -> Self {
        level.0
    }
}

impl std::fmt::Display for FadeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
