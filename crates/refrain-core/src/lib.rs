//! # Refrain Core
//!
//! Memorization engine for song lyrics. A singer practices a song chunk by
//! chunk; each chunk is shown with more of its words faded out as recall
//! improves, and comes back on an SM-2 style schedule.
//!
//! - **Fade engine**: deterministic, monotonic word concealment per fade level
//! - **Review scheduler**: SM-2 ease factor, bootstrap intervals, regression
//!   on failure, overdue decay of memory strength
//! - **Memory status**: `fragile` to `locked_in`, always derived, never stored as input
//! - **Sessions**: due queue, per-chunk atomic review, XP and improvement summary
//! - **Storage**: SQLite with optimistic versioning and an append-only review log
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use refrain_core::{ChunkRef, ProgressStore, Rating, ReviewScheduler, SessionOrchestrator, Storage};
//!
//! let storage = Arc::new(Storage::new(None)?);
//! storage.register_chunk(&chunk)?;
//! storage.assign_chunk("singer-1", &chunk.id, chrono::Utc::now())?;
//!
//! let orchestrator = SessionOrchestrator::new(storage, ReviewScheduler::default());
//! let mut session = orchestrator.start_session("singer-1", chrono::Utc::now())?;
//! while let Some(due) = session.current() {
//!     // render due.chunk with session.current_plan() ...
//!     session.submit(Rating::NailedIt, chrono::Utc::now())?;
//! }
//! let summary = session.finish(chrono::Utc::now());
//! ```
//!
//! ## Feature Flags
//!
//! - `bundled-sqlite` (default): SQLite compiled in
//! - `encryption`: SQLCipher, keyed by `REFRAIN_ENCRYPTION_KEY`

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod config;
pub mod error;
pub mod fade;
pub mod progress;
pub mod scheduler;
pub mod session;
pub mod status;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use config::PracticeConfig;
pub use error::{Error, Result};

pub use fade::{
    render_line, FadeLevel, FadeLevelEngine, FadeSeed, LinePlan, RevealSet, WordState,
    WordVisibility,
};

pub use progress::{ChunkProgress, ChunkRef, DueChunk, NewChunk};

pub use scheduler::{PreviewResults, Rating, ReviewResult, ReviewScheduler, SchedulerParams};

pub use session::{
    FailedReview, PracticeSession, ReviewOutcome, SessionOrchestrator, SessionSummary,
    StatusImprovement, XpTable,
};

pub use status::{MemoryStatus, MemoryStatusClassifier};

pub use storage::{ProgressStore, ReviewLogEntry, Storage, StorageError, UserStats};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Highest fade level
pub const MAX_FADE_LEVEL: u8 = FadeLevel::MAX.get();

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{
        ChunkProgress, ChunkRef, Error, FadeLevel, FadeLevelEngine, MemoryStatus, ProgressStore,
        Rating, Result, ReviewScheduler, SessionOrchestrator, Storage,
    };
}
