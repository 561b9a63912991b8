//! Storage Module
//!
//! SQLite-based storage layer with:
//! - Chunk registry fed by the lyrics side
//! - One progress row per (user, chunk), guarded by an optimistic version
//! - Review log for history, XP totals and status transitions

mod migrations;
mod sqlite;

pub use migrations::MIGRATIONS;
pub use sqlite::{ReviewLogEntry, Result, Storage, StorageError, UserStats};

use chrono::{DateTime, Utc};

use crate::progress::{ChunkProgress, ChunkRef, DueChunk};
use crate::scheduler::ReviewResult;

/// Persistence boundary used by practice sessions.
///
/// Implementations must return records whose status is derived by their
/// classifier, and must make [`save_review`](Self::save_review) atomic:
/// either the progress row and its log entry are both written or neither is.
pub trait ProgressStore: Send + Sync {
    fn get_progress(&self, user_id: &str, chunk_id: &str) -> Result<Option<ChunkProgress>>;

    /// Due chunks for a user, earliest `next_review_at` first, ties broken
    /// by song position.
    fn due_progress(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<DueChunk>>;

    /// Persist the outcome of a review.
    ///
    /// `result.progress.version` must be the version that was read; a row
    /// that has moved on since then fails with [`StorageError::Conflict`].
    /// Returns the stored record with its new version.
    fn save_review(&self, result: &ReviewResult, xp_earned: u32) -> Result<ChunkProgress>;

    fn get_chunk(&self, chunk_id: &str) -> Result<Option<ChunkRef>>;

    /// Create the default progress row. Existing rows are returned untouched.
    fn assign_chunk(&self, user_id: &str, chunk_id: &str, now: DateTime<Utc>)
        -> Result<ChunkProgress>;

    fn list_progress(&self, user_id: &str) -> Result<Vec<ChunkProgress>>;

    /// Most recent log entries first, optionally for one chunk only.
    fn review_history(
        &self,
        user_id: &str,
        chunk_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ReviewLogEntry>>;
}
