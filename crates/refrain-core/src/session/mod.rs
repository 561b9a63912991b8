//! # Session Orchestration
//!
//! Ties the scheduler, the fade engine and the store together for one user:
//!
//! 1. [`SessionOrchestrator::due_queue`] snapshots the chunks that are due
//! 2. the caller renders each chunk at its stored fade level
//! 3. [`SessionOrchestrator::submit_review`] reads the stored row, advances
//!    it and writes it back atomically
//! 4. a [`SessionSummary`] accumulates XP and status improvements
//!
//! Every review is an independent read-modify-write. A failed write leaves
//! the row untouched, so the chunk stays due and the same rating can be
//! submitted again.

mod practice;
mod summary;

pub use practice::PracticeSession;
pub use summary::{FailedReview, SessionSummary, StatusImprovement, XpTable};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::fade::{FadeLevel, FadeLevelEngine, LinePlan};
use crate::progress::{ChunkProgress, DueChunk};
use crate::scheduler::{PreviewResults, Rating, ReviewScheduler};
use crate::status::MemoryStatus;
use crate::storage::ProgressStore;

/// Result of a persisted review
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    /// The stored record, with its new version
    pub progress: ChunkProgress,
    pub previous_status: MemoryStatus,
    pub xp_earned: u32,
    pub extra_practice: bool,
}

impl ReviewOutcome {
    pub fn improved(&self) -> bool {
        self.progress.status() > self.previous_status
    }
}

/// Drives practice for any [`ProgressStore`]
pub struct SessionOrchestrator<S: ProgressStore + ?Sized> {
    store: Arc<S>,
    scheduler: ReviewScheduler,
    fade_engine: FadeLevelEngine,
    xp_table: XpTable,
}

impl<S: ProgressStore + ?Sized> SessionOrchestrator<S> {
    pub fn new(store: Arc<S>, scheduler: ReviewScheduler) -> Self {
        Self {
            store,
            scheduler,
            fade_engine: FadeLevelEngine::default(),
            xp_table: XpTable::default(),
        }
    }

    pub fn with_fade_engine(mut self, engine: FadeLevelEngine) -> Self {
        self.fade_engine = engine;
        self
    }

    pub fn with_xp_table(mut self, xp_table: XpTable) -> Self {
        self.xp_table = xp_table;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn scheduler(&self) -> &ReviewScheduler {
        &self.scheduler
    }

    pub fn fade_engine(&self) -> &FadeLevelEngine {
        &self.fade_engine
    }

    pub fn xp_table(&self) -> &XpTable {
        &self.xp_table
    }

    /// Due chunks, most overdue first, ties broken by position in the song.
    pub fn due_queue(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<DueChunk>> {
        let mut queue = self.store.due_progress(user_id, now)?;
        queue.sort_by(DueChunk::queue_order);
        tracing::debug!(user_id, due = queue.len(), "Built due queue");
        Ok(queue)
    }

    /// Fade plans for every line of a due chunk at its stored level
    pub fn plan_for(&self, due: &DueChunk) -> Vec<LinePlan> {
        self.fade_engine.plan_chunk(&due.chunk, due.progress.fade_level)
    }

    /// Fade plans for a chunk at an explicit level
    pub fn plan_at(&self, chunk_id: &str, level: FadeLevel) -> Result<Vec<LinePlan>> {
        let chunk = self
            .store
            .get_chunk(chunk_id)?
            .ok_or_else(|| Error::NotFound(format!("chunk {}", chunk_id)))?;
        Ok(self.fade_engine.plan_chunk(&chunk, level))
    }

    /// Apply one self-rating and persist the result.
    ///
    /// Reads the current stored row, so resubmitting after a failed write
    /// never double-applies.
    pub fn submit_review(
        &self,
        user_id: &str,
        chunk_id: &str,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> Result<ReviewOutcome> {
        let current = self.load(user_id, chunk_id)?;
        let result = self.scheduler.advance(&current, rating, now);
        let xp_earned = self.xp_table.xp(rating);

        let stored = match self.store.save_review(&result, xp_earned) {
            Ok(stored) => stored,
            Err(e) => {
                let err = Error::from(e);
                tracing::warn!(
                    user_id,
                    chunk_id,
                    rating = %rating,
                    error = %err,
                    "Review not persisted, chunk stays due"
                );
                return Err(err);
            }
        };

        tracing::info!(
            user_id,
            chunk_id,
            rating = %rating,
            old_status = %result.previous_status,
            new_status = %stored.status(),
            interval_days = stored.interval_days,
            fade_level = %stored.fade_level,
            extra_practice = result.extra_practice,
            xp = xp_earned,
            "Review recorded"
        );

        Ok(ReviewOutcome {
            progress: stored,
            previous_status: result.previous_status,
            xp_earned,
            extra_practice: result.extra_practice,
        })
    }

    /// Outcomes of each rating for a stored row, nothing persisted
    pub fn preview(
        &self,
        user_id: &str,
        chunk_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(ChunkProgress, PreviewResults)> {
        let current = self.load(user_id, chunk_id)?;
        let preview = self.scheduler.preview(&current, now);
        Ok((current, preview))
    }

    /// Start an interactive session over the queue as it is right now.
    pub fn start_session(&self, user_id: &str, now: DateTime<Utc>) -> Result<PracticeSession<'_, S>> {
        let queue = self.due_queue(user_id, now)?;
        tracing::info!(user_id, due = queue.len(), "Practice session started");
        Ok(PracticeSession::new(self, user_id, queue, now))
    }

    /// Record a whole session at once.
    ///
    /// Reviews are applied in order. A failure is collected into
    /// `summary.failed` and the rest of the batch still runs.
    pub fn record_batch<I, C>(&self, user_id: &str, reviews: I, now: DateTime<Utc>) -> SessionSummary
    where
        I: IntoIterator<Item = (C, Rating)>,
        C: AsRef<str>,
    {
        let mut summary = SessionSummary::new(user_id, now);
        for (chunk_id, rating) in reviews {
            let chunk_id = chunk_id.as_ref();
            match self.submit_review(user_id, chunk_id, rating, now) {
                Ok(outcome) => {
                    let label = self.label_for(chunk_id);
                    summary.record(&label, &outcome);
                }
                Err(e) => summary.record_failure(chunk_id, rating, &e),
            }
        }
        tracing::info!(
            user_id,
            reviewed = summary.chunks_reviewed,
            failed = summary.failed.len(),
            xp = summary.total_xp,
            "Batch recorded"
        );
        summary.finish(now)
    }

    fn load(&self, user_id: &str, chunk_id: &str) -> Result<ChunkProgress> {
        self.store
            .get_progress(user_id, chunk_id)?
            .ok_or_else(|| Error::NotFound(format!("progress {}/{}", user_id, chunk_id)))
    }

    fn label_for(&self, chunk_id: &str) -> String {
        match self.store.get_chunk(chunk_id) {
            Ok(Some(chunk)) => chunk.label,
            _ => chunk_id.to_string(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
