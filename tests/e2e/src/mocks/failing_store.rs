//! Store wrapper that fails writes on demand

use chrono::{DateTime, Utc};
use refrain_core::storage::Result;
use refrain_core::{
    ChunkProgress, ChunkRef, DueChunk, ProgressStore, ReviewLogEntry, ReviewResult, Storage,
    StorageError,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Delegates to a real [`Storage`] but rejects `save_review` for selected
/// chunks, or for everything while offline.
pub struct FailingStore {
    inner: Arc<Storage>,
    failing: Mutex<HashSet<String>>,
    offline: AtomicBool,
    rejected: AtomicUsize,
}

impl FailingStore {
    pub fn new(inner: Arc<Storage>) -> Self {
        Self {
            inner,
            failing: Mutex::new(HashSet::new()),
            offline: AtomicBool::new(false),
            rejected: AtomicUsize::new(0),
        }
    }

    /// Fail every save for this chunk until [`heal`](Self::heal)
    pub fn fail_saves_for(&self, chunk_id: &str) {
        self.failing.lock().unwrap().insert(chunk_id.to_string());
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
        self.set_offline(false);
    }

    /// Saves rejected so far
    pub fn rejected(&self) -> usize {
        self.rejected.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &Storage {
        &self.inner
    }
}

impl ProgressStore for FailingStore {
    fn get_progress(&self, user_id: &str, chunk_id: &str) -> Result<Option<ChunkProgress>> {
        self.inner.get_progress(user_id, chunk_id)
    }

    fn due_progress(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<DueChunk>> {
        self.inner.due_progress(user_id, now)
    }

    fn save_review(&self, result: &ReviewResult, xp_earned: u32) -> Result<ChunkProgress> {
        let chunk_id = &result.progress.chunk_id;
        if self.offline.load(Ordering::SeqCst) || self.failing.lock().unwrap().contains(chunk_id) {
            self.rejected.fetch_add(1, Ordering::SeqCst);
            return Err(StorageError::Init(format!("store offline for {}", chunk_id)));
        }
        self.inner.save_review(result, xp_earned)
    }

    fn get_chunk(&self, chunk_id: &str) -> Result<Option<ChunkRef>> {
        ProgressStore::get_chunk(self.inner.as_ref(), chunk_id)
    }

    fn assign_chunk(
        &self,
        user_id: &str,
        chunk_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ChunkProgress> {
        self.inner.assign_chunk(user_id, chunk_id, now)
    }

    fn list_progress(&self, user_id: &str) -> Result<Vec<ChunkProgress>> {
        self.inner.list_progress(user_id)
    }

    fn review_history(
        &self,
        user_id: &str,
        chunk_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ReviewLogEntry>> {
        self.inner.review_history(user_id, chunk_id, limit)
    }
}
