//! Session summary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ReviewOutcome;
use crate::error::Error;
use crate::scheduler::Rating;
use crate::status::MemoryStatus;

/// Fixed XP per rating. Handed to the gamification ledger; never
/// computed by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct XpTable {
    pub nailed_it: u32,
    pub almost: u32,
    pub struggling: u32,
}

impl Default for XpTable {
    fn default() -> Self {
        Self {
            nailed_it: 10,
            almost: 5,
            struggling: 2,
        }
    }
}

impl XpTable {
    #[inline]
    pub fn xp(&self, rating: Rating) -> u32 {
        match rating {
            Rating::NailedIt => self.nailed_it,
            Rating::Almost => self.almost,
            Rating::Struggling => self.struggling,
        }
    }
}

/// A chunk whose status strictly improved during the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusImprovement {
    pub chunk_id: String,
    pub chunk_label: String,
    pub old_status: MemoryStatus,
    pub new_status: MemoryStatus,
}

/// A review that could not be persisted. The chunk is still due.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedReview {
    pub chunk_id: String,
    pub rating: Rating,
    /// Error kind, as in API error bodies
    pub kind: &'static str,
    pub message: String,
    pub retryable: bool,
}

/// What a practice session accomplished
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub user_id: String,
    /// Reviews that were persisted
    pub chunks_reviewed: usize,
    /// How many of those arrived before the chunk was due
    pub extra_practice: usize,
    pub total_xp: u32,
    pub improvements: Vec<StatusImprovement>,
    pub failed: Vec<FailedReview>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl SessionSummary {
    pub fn new(user_id: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            chunks_reviewed: 0,
            extra_practice: 0,
            total_xp: 0,
            improvements: Vec::new(),
            failed: Vec::new(),
            started_at,
            finished_at: None,
        }
    }

    /// Account for a persisted review.
    ///
    /// A success clears any earlier failure recorded for the same chunk.
    pub fn record(&mut self, chunk_label: &str, outcome: &ReviewOutcome) {
        let chunk_id = &outcome.progress.chunk_id;
        self.chunks_reviewed += 1;
        self.total_xp = self.total_xp.saturating_add(outcome.xp_earned);
        if outcome.extra_practice {
            self.extra_practice += 1;
        }
        if outcome.improved() {
            self.improvements.push(StatusImprovement {
                chunk_id: chunk_id.clone(),
                chunk_label: chunk_label.to_string(),
                old_status: outcome.previous_status,
                new_status: outcome.progress.status(),
            });
        }
        self.failed.retain(|f| &f.chunk_id != chunk_id);
    }

    pub fn record_failure(&mut self, chunk_id: &str, rating: Rating, error: &Error) {
        self.failed.retain(|f| f.chunk_id != chunk_id);
        self.failed.push(FailedReview {
            chunk_id: chunk_id.to_string(),
            rating,
            kind: error.kind(),
            message: error.to_string(),
            retryable: error.is_retryable(),
        });
    }

    pub fn finish(mut self, now: DateTime<Utc>) -> Self {
        self.finished_at = Some(now);
        self
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}
