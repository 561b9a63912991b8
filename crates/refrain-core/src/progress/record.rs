//! Chunk Progress - the per-user scheduling record
//!
//! Each record holds:
//! - Fade level for the next practice attempt
//! - SM-2 state (ease factor, interval, consecutive successes)
//! - Smoothed memory strength (0-100)
//! - Review history used by the status classifier
//! - A derived status that can only be recomputed, never set

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::fade::FadeLevel;
use crate::scheduler::{
    clamp_memory_strength, sanitize_ease_factor, Rating, SchedulerParams, DEFAULT_EASE_FACTOR,
};
use crate::status::{MemoryStatus, MemoryStatusClassifier};

/// Number of most recent ratings kept on the record
pub const RECENT_RATINGS_CAPACITY: usize = 10;

/// Scheduling state of one chunk for one user
///
/// Unique on `(user_id, chunk_id)`.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkProgress {
    pub user_id: String,
    pub chunk_id: String,

    // ========== Recall aid ==========
    /// 0 = fully visible, 5 = fully concealed
    pub fade_level: FadeLevel,

    // ========== SM-2 state ==========
    /// Interval growth multiplier, floored at 1.3
    pub ease_factor: f64,
    /// Days until the next scheduled review (>= 1)
    pub interval_days: u32,
    /// Consecutive successful reviews; reset by a struggle
    pub repetitions: u32,
    /// All review attempts, successes and failures
    pub review_count: u32,
    pub next_review_at: DateTime<Utc>,
    pub last_reviewed_at: Option<DateTime<Utc>>,

    // ========== Memory model ==========
    /// Smoothed confidence score, 0-100
    pub memory_strength: f64,
    /// Most recent ratings, oldest first
    pub recent_ratings: Vec<Rating>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency token, bumped by every successful write
    pub version: i64,

    status: MemoryStatus,
}

impl ChunkProgress {
    /// Default record for a chunk that was just assigned to a user.
    pub fn new(user_id: impl Into<String>, chunk_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            chunk_id: chunk_id.into(),
            fade_level: FadeLevel::MIN,
            ease_factor: DEFAULT_EASE_FACTOR,
            interval_days: 1,
            repetitions: 0,
            review_count: 0,
            next_review_at: now,
            last_reviewed_at: None,
            memory_strength: 0.0,
            recent_ratings: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
            status: MemoryStatus::Fragile,
        }
    }

    /// Derived memory status
    #[inline]
    pub fn status(&self) -> MemoryStatus {
        self.status
    }

    /// Recompute the status from the other fields.
    ///
    /// This is the only way the status changes.
    pub fn refresh_status(&mut self, classifier: &MemoryStatusClassifier) {
        self.status = classifier.classify(
            self.memory_strength,
            self.fade_level,
            self.review_count,
            &self.recent_ratings,
        );
    }

    /// Builder-style variant of [`refresh_status`](Self::refresh_status)
    pub fn with_refreshed_status(mut self, classifier: &MemoryStatusClassifier) -> Self {
        self.refresh_status(classifier);
        self
    }

    #[inline]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at <= now
    }

    /// Append a rating, keeping only the most recent entries.
    pub fn push_rating(&mut self, rating: Rating) {
        self.recent_ratings.push(rating);
        if self.recent_ratings.len() > RECENT_RATINGS_CAPACITY {
            let excess = self.recent_ratings.len() - RECENT_RATINGS_CAPACITY;
            self.recent_ratings.drain(..excess);
        }
    }

    /// Copy with every numeric field pulled back inside its invariant.
    ///
    /// Status is carried over untouched; callers that change fields
    /// recompute it afterwards.
    pub fn sanitized(&self, params: &SchedulerParams) -> Self {
        let mut clean = self.clone();
        let floor = params.ease_floor();
        clean.ease_factor =
            sanitize_ease_factor(self.ease_factor, floor, params.initial_ease_factor);
        clean.interval_days = self.interval_days.clamp(1, params.max_interval_days.max(1));
        clean.memory_strength = clamp_memory_strength(self.memory_strength);
        if clean.recent_ratings.len() > RECENT_RATINGS_CAPACITY {
            let excess = clean.recent_ratings.len() - RECENT_RATINGS_CAPACITY;
            clean.recent_ratings.drain(..excess);
        }
        clean
    }
}
