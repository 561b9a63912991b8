//! Interactive practice session
//!
//! One chunk at a time, in the order the queue had when the session started.
//! Chunks that become due mid-session wait for the next session.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use super::{ReviewOutcome, SessionOrchestrator, SessionSummary};
use crate::error::{Error, Result};
use crate::fade::{LinePlan, RevealSet};
use crate::progress::DueChunk;
use crate::scheduler::Rating;
use crate::storage::ProgressStore;

pub struct PracticeSession<'a, S: ProgressStore + ?Sized> {
    orchestrator: &'a SessionOrchestrator<S>,
    user_id: String,
    queue: VecDeque<DueChunk>,
    reveals: RevealSet,
    summary: SessionSummary,
}

impl<'a, S: ProgressStore + ?Sized> PracticeSession<'a, S> {
    pub(super) fn new(
        orchestrator: &'a SessionOrchestrator<S>,
        user_id: &str,
        queue: Vec<DueChunk>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            orchestrator,
            user_id: user_id.to_string(),
            queue: queue.into(),
            reveals: RevealSet::new(),
            summary: SessionSummary::new(user_id, now),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Chunk awaiting a rating
    pub fn current(&self) -> Option<&DueChunk> {
        self.queue.front()
    }

    /// Plans for the current chunk at its stored level, with taps applied
    pub fn current_plan(&self) -> Option<Vec<LinePlan>> {
        let due = self.current()?;
        let plans = self.orchestrator.plan_for(due);
        Some(
            plans
                .iter()
                .enumerate()
                .map(|(line, plan)| self.reveals.apply(line, plan))
                .collect(),
        )
    }

    /// Tap-to-reveal one word of the current chunk.
    ///
    /// Session-local: the stored fade level and plan are unaffected.
    pub fn reveal(&mut self, line_index: usize, word_index: usize) {
        self.reveals.reveal(line_index, word_index);
    }

    /// Rate the current chunk and move on.
    ///
    /// A retryable failure keeps the chunk current so the same rating can be
    /// resubmitted, or [`skip`](Self::skip) leaves it due for a later session.
    /// Any other failure is recorded in the summary and the session moves on.
    pub fn submit(&mut self, rating: Rating, now: DateTime<Utc>) -> Result<ReviewOutcome> {
        let (chunk_id, label) = match self.current() {
            Some(due) => (due.chunk.id.clone(), due.chunk.label.clone()),
            None => return Err(Error::Validation("No chunk left in this session".into())),
        };

        match self
            .orchestrator
            .submit_review(&self.user_id, &chunk_id, rating, now)
        {
            Ok(outcome) => {
                self.summary.record(&label, &outcome);
                self.queue.pop_front();
                self.reveals.clear();
                Ok(outcome)
            }
            Err(e) => {
                self.summary.record_failure(&chunk_id, rating, &e);
                if !e.is_retryable() {
                    tracing::warn!(
                        user_id = %self.user_id,
                        chunk_id = %chunk_id,
                        kind = e.kind(),
                        "Dropping chunk from session after permanent failure"
                    );
                    self.queue.pop_front();
                    self.reveals.clear();
                }
                Err(e)
            }
        }
    }

    /// Drop the current chunk from this session without rating it.
    pub fn skip(&mut self) -> Option<DueChunk> {
        self.reveals.clear();
        self.queue.pop_front()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Running totals so far
    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    /// End the session. Unrated chunks stay due exactly as they were.
    pub fn finish(self, now: DateTime<Utc>) -> SessionSummary {
        tracing::info!(
            user_id = %self.user_id,
            reviewed = self.summary.chunks_reviewed,
            abandoned = self.queue.len(),
            xp = self.summary.total_xp,
            "Practice session finished"
        );
        self.summary.finish(now)
    }
}
