//! Progress module - core data types
//!
//! - [`ChunkProgress`]: one scheduling record per (user, chunk)
//! - [`ChunkRef`]: the lyric chunk a record points at (owned by the lyrics side)
//! - [`DueChunk`]: the pair, as handed to a practice session

mod chunk;
mod record;

pub use chunk::{ChunkRef, NewChunk};
pub use record::{ChunkProgress, RECENT_RATINGS_CAPACITY};

use serde::Serialize;

/// A chunk whose review time has passed, with the lyric data needed to render it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueChunk {
    pub progress: ChunkProgress,
    pub chunk: ChunkRef,
}

impl DueChunk {
    /// Due-queue order: earliest `next_review_at` first, then song position.
    pub fn queue_order(a: &DueChunk, b: &DueChunk) -> std::cmp::Ordering {
        a.progress
            .next_review_at
            .cmp(&b.progress.next_review_at)
            .then_with(|| a.chunk.position.cmp(&b.chunk.position))
            .then_with(|| a.chunk.song_id.cmp(&b.chunk.song_id))
            .then_with(|| a.chunk.id.cmp(&b.chunk.id))
    }
}
