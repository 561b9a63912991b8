//! Review scheduler
//!
//! Turns a stored progress record plus a self-rating into the next record.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::algorithm::{
    clamp_memory_strength, next_ease_factor, next_interval, overdue_days, overdue_decay,
    DEFAULT_BOOTSTRAP_INTERVALS, DEFAULT_EASE_FACTOR, DEFAULT_MAX_INTERVAL_DAYS, MIN_EASE_FACTOR,
};
use crate::error::Error;
use crate::progress::ChunkProgress;
use crate::status::{MemoryStatus, MemoryStatusClassifier};

// ============================================================================
// RATING
// ============================================================================

/// Self-assessed recall after a practice attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    /// Recalled without help
    NailedIt,
    /// Recalled with some hesitation or small slips
    Almost,
    /// Could not recall
    Struggling,
}

impl Rating {
    /// SM-2 quality score
    pub fn quality(&self) -> u8 {
        match self {
            Rating::NailedIt => 5,
            Rating::Almost => 3,
            Rating::Struggling => 0,
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.quality() >= 3
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::NailedIt => "nailed_it",
            Rating::Almost => "almost",
            Rating::Struggling => "struggling",
        }
    }

    pub fn all() -> [Rating; 3] {
        [Rating::NailedIt, Rating::Almost, Rating::Struggling]
    }
}

impl FromStr for Rating {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nailed_it" | "nailed-it" | "nailedit" => Ok(Rating::NailedIt),
            "almost" => Ok(Rating::Almost),
            "struggling" => Ok(Rating::Struggling),
            other => Err(Error::Validation(format!(
                "Unknown rating '{}': expected nailed_it, almost or struggling",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// PARAMETERS
// ============================================================================

/// Tunable scheduler constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchedulerParams {
    pub initial_ease_factor: f64,
    pub min_ease_factor: f64,
    /// Fixed intervals for the first consecutive successes
    pub bootstrap_intervals: Vec<u32>,
    pub max_interval_days: u32,
    /// Ease factor lost on a struggle (kept mild, unlike classic SM-2)
    pub failure_ease_penalty: f64,
    pub nailed_it_gain: f64,
    pub almost_gain: f64,
    pub struggle_penalty: f64,
    /// Strength lost per day a review is late
    pub overdue_decay_per_day: f64,
    pub max_overdue_decay: f64,
}

impl Default for SchedulerParams {
    fn default() -> Self {
        Self {
            initial_ease_factor: DEFAULT_EASE_FACTOR,
            min_ease_factor: MIN_EASE_FACTOR,
            bootstrap_intervals: DEFAULT_BOOTSTRAP_INTERVALS.to_vec(),
            max_interval_days: DEFAULT_MAX_INTERVAL_DAYS,
            failure_ease_penalty: 0.15,
            nailed_it_gain: 20.0,
            almost_gain: 10.0,
            struggle_penalty: 15.0,
            overdue_decay_per_day: 2.0,
            max_overdue_decay: 30.0,
        }
    }
}

impl SchedulerParams {
    /// Ease factor floor, never below the SM-2 minimum
    pub fn ease_floor(&self) -> f64 {
        if self.min_ease_factor.is_finite() {
            self.min_ease_factor.max(MIN_EASE_FACTOR)
        } else {
            MIN_EASE_FACTOR
        }
    }

    fn gain(&self, rating: Rating) -> f64 {
        match rating {
            Rating::NailedIt => self.nailed_it_gain,
            Rating::Almost => self.almost_gain,
            Rating::Struggling => 0.0,
        }
    }
}

// ============================================================================
// RESULTS
// ============================================================================

/// Outcome of a single review
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResult {
    /// The record to persist
    pub progress: ChunkProgress,
    /// Status before the review
    pub previous_status: MemoryStatus,
    pub rating: Rating,
    /// Review arrived before `next_review_at`
    pub extra_practice: bool,
    /// Days past due at review time (0 when on time or early)
    pub overdue_days: f64,
}

impl ReviewResult {
    /// True when the classifier output strictly improved
    pub fn improved(&self) -> bool {
        self.progress.status() > self.previous_status
    }
}

/// Outcomes for every rating, computed without persisting anything
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResults {
    pub nailed_it: ReviewResult,
    pub almost: ReviewResult,
    pub struggling: ReviewResult,
}

// ============================================================================
// SCHEDULER
// ============================================================================

/// SM-2 review scheduler
///
/// Stateless apart from configuration: `advance` is a pure function of the
/// stored record, the rating and the clock value passed in.
#[derive(Debug, Clone, Default)]
pub struct ReviewScheduler {
    params: SchedulerParams,
    classifier: MemoryStatusClassifier,
}

impl ReviewScheduler {
    pub fn new(params: SchedulerParams, classifier: MemoryStatusClassifier) -> Self {
        Self { params, classifier }
    }

    pub fn params(&self) -> &SchedulerParams {
        &self.params
    }

    pub fn classifier(&self) -> &MemoryStatusClassifier {
        &self.classifier
    }

    /// A chunk is due once its next review time has passed.
    pub fn is_due(&self, progress: &ChunkProgress, now: DateTime<Utc>) -> bool {
        progress.next_review_at <= now
    }

    /// Compute the next progress record for `rating` at `now`.
    ///
    /// Stored values are sanitized first, so corrupt rows (ease factor under
    /// the floor, strength out of range) degrade to the nearest valid value
    /// instead of failing.
    ///
    /// Successful reviews submitted before the chunk is due count as extra
    /// practice: the review is counted and logged, but interval, ease factor,
    /// fade level, strength and the next review time are left alone.
    pub fn advance(
        &self,
        progress: &ChunkProgress,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> ReviewResult {
        let current = progress.sanitized(&self.params);
        let previous_status = progress.status();
        let extra_practice = !self.is_due(&current, now);
        let days_late = overdue_days(current.next_review_at, now);
        let floor = self.params.ease_floor();

        let mut next = current.clone();

        if !rating.is_success() {
            next.interval_days = 1;
            next.repetitions = 0;
            next.fade_level = current.fade_level.lower();
            next.ease_factor =
                (current.ease_factor - self.params.failure_ease_penalty.max(0.0)).max(floor);
            next.memory_strength = clamp_memory_strength(
                current.memory_strength - self.params.struggle_penalty.max(0.0),
            );
            next.next_review_at = now + Duration::days(1);
        } else if !extra_practice {
            let ease = next_ease_factor(current.ease_factor, rating.quality(), floor);
            next.interval_days = next_interval(
                current.interval_days,
                ease,
                current.repetitions,
                &self.params.bootstrap_intervals,
                self.params.max_interval_days,
            );
            next.ease_factor = ease;
            next.repetitions = current.repetitions.saturating_add(1);
            if rating == Rating::NailedIt {
                next.fade_level = current.fade_level.raise();
            }
            let decay = overdue_decay(
                days_late,
                self.params.overdue_decay_per_day,
                self.params.max_overdue_decay,
            );
            next.memory_strength = clamp_memory_strength(
                current.memory_strength + self.params.gain(rating) - decay,
            );
            next.next_review_at = now + Duration::days(i64::from(next.interval_days));
        }

        next.review_count = current.review_count.saturating_add(1);
        next.push_rating(rating);
        next.last_reviewed_at = Some(now);
        next.updated_at = now;
        next.refresh_status(&self.classifier);

        ReviewResult {
            progress: next,
            previous_status,
            rating,
            extra_practice,
            overdue_days: days_late,
        }
    }

    /// Preview all three outcomes (nothing is persisted).
    pub fn preview(&self, progress: &ChunkProgress, now: DateTime<Utc>) -> PreviewResults {
        PreviewResults {
            nailed_it: self.advance(progress, Rating::NailedIt, now),
            almost: self.advance(progress, Rating::Almost, now),
            struggling: self.advance(progress, Rating::Struggling, now),
        }
    }
}


// ============================================================================
// TESTS
// ============================================================================
