//! # Memory Status
//!
//! Categorical summary of how well a chunk is memorized:
//!
//! | Status      | Meaning                                                   |
//! |-------------|-----------------------------------------------------------|
//! | fragile     | Never reviewed, or barely retained                        |
//! | shaky       | Some recall, unreliable                                   |
//! | developing  | Recall usually works with cues                            |
//! | solid       | Strong recall                                             |
//! | locked_in   | Strong recall at full concealment with no recent struggle |
//!
//! Status is always derived. Nothing stores or accepts a status that was not
//! produced by [`MemoryStatusClassifier::classify`].

use serde::{Deserialize, Serialize};

use crate::fade::FadeLevel;
use crate::scheduler::Rating;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default memory strength where `shaky` begins
pub const DEFAULT_SHAKY_THRESHOLD: f64 = 20.0;

/// Default memory strength where `developing` begins
pub const DEFAULT_DEVELOPING_THRESHOLD: f64 = 40.0;

/// Default memory strength where `solid` begins
pub const DEFAULT_SOLID_THRESHOLD: f64 = 65.0;

/// Default memory strength required for `locked_in`
pub const DEFAULT_LOCKED_IN_THRESHOLD: f64 = 85.0;

/// Default number of most recent ratings checked for struggles
pub const DEFAULT_STRUGGLE_LOOKBACK: usize = 5;

// ============================================================================
// MEMORY STATUS ENUM
// ============================================================================

/// Memorization status of a chunk, ordered from weakest to strongest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum MemoryStatus {
    #[default]
    Fragile,
    Shaky,
    Developing,
    Solid,
    LockedIn,
}

impl MemoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryStatus::Fragile => "fragile",
            MemoryStatus::Shaky => "shaky",
            MemoryStatus::Developing => "developing",
            MemoryStatus::Solid => "solid",
            MemoryStatus::LockedIn => "locked_in",
        }
    }

    /// Parse from string name.
    pub fn parse_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "fragile" => MemoryStatus::Fragile,
            "shaky" => MemoryStatus::Shaky,
            "developing" => MemoryStatus::Developing,
            "solid" => MemoryStatus::Solid,
            "locked_in" | "lockedin" | "locked-in" => MemoryStatus::LockedIn,
            _ => MemoryStatus::Fragile, // Safe default
        }
    }

    /// Get a human-readable description of the status.
    pub fn description(&self) -> &'static str {
        match self {
            MemoryStatus::Fragile => "Just starting - keep the words in front of you",
            MemoryStatus::Shaky => "Some of it sticks, cues still needed",
            MemoryStatus::Developing => "Recall works with a few hints",
            MemoryStatus::Solid => "Strong recall, ready for full concealment",
            MemoryStatus::LockedIn => "Recalled from memory alone, consistently",
        }
    }

    /// Gate check for consumers such as minigame unlocks.
    #[inline]
    pub fn meets(&self, minimum: MemoryStatus) -> bool {
        *self >= minimum
    }

    pub fn all() -> [MemoryStatus; 5] {
        [
            MemoryStatus::Fragile,
            MemoryStatus::Shaky,
            MemoryStatus::Developing,
            MemoryStatus::Solid,
            MemoryStatus::LockedIn,
        ]
    }
}

impl std::fmt::Display for MemoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

/// Pure, total mapping from progress fields to a [`MemoryStatus`].
///
/// Monotonic in memory strength when the other inputs are held fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemoryStatusClassifier {
    pub shaky_threshold: f64,
    pub developing_threshold: f64,
    pub solid_threshold: f64,
    pub locked_in_threshold: f64,
    /// How many of the most recent ratings must be free of `struggling`
    pub struggle_lookback: usize,
}

impl Default for MemoryStatusClassifier {
    fn default() -> Self {
        Self {
            shaky_threshold: DEFAULT_SHAKY_THRESHOLD,
            developing_threshold: DEFAULT_DEVELOPING_THRESHOLD,
            solid_threshold: DEFAULT_SOLID_THRESHOLD,
            locked_in_threshold: DEFAULT_LOCKED_IN_THRESHOLD,
            struggle_lookback: DEFAULT_STRUGGLE_LOOKBACK,
        }
    }
}

impl MemoryStatusClassifier {
    /// Classify a chunk.
    ///
    /// `recent_ratings` is ordered oldest first; only the last
    /// `struggle_lookback` entries are considered.
    pub fn classify(
        &self,
        memory_strength: f64,
        fade_level: FadeLevel,
        review_count: u32,
        recent_ratings: &[Rating],
    ) -> MemoryStatus {
        if review_count == 0 {
            return MemoryStatus::Fragile;
        }

        // NaN counts as no strength at all
        let strength = if memory_strength.is_nan() {
            0.0
        } else {
            memory_strength.clamp(0.0, 100.0)
        };

        if strength < self.shaky_threshold {
            MemoryStatus::Fragile
        } else if strength < self.developing_threshold {
            MemoryStatus::Shaky
        } else if strength < self.solid_threshold {
            MemoryStatus::Developing
        } else if strength < self.locked_in_threshold {
            MemoryStatus::Solid
        } else if fade_level.is_full_concealment() && !self.struggled_recently(recent_ratings) {
            MemoryStatus::LockedIn
        } else {
            // Mastery needs demonstrated recall at full concealment
            MemoryStatus::Solid
        }
    }

    fn struggled_recently(&self, recent_ratings: &[Rating]) -> bool {
        let start = recent_ratings.len().saturating_sub(self.struggle_lookback);
        recent_ratings[start..]
            .iter()
            .any(|r| *r == Rating::Struggling)
    }
}

// ============================================================================
// TESTS
// ============================================================================
