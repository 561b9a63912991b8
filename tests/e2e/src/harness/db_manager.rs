//! Test Database Manager
//!
//! Provides isolated database instances for testing:
//! - Temporary databases that are automatically cleaned up
//! - Pre-seeded songs assigned to a user
//! - Reopening the same file to check durability

use chrono::{DateTime, Utc};
use refrain_core::{
    ChunkProgress, ChunkRef, ProgressStore, ReviewScheduler, SessionOrchestrator, Storage,
};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use crate::mocks::TestDataFactory;

/// Manager for test databases
///
/// Creates isolated database instances for each test to prevent interference.
/// Automatically cleans up temporary databases when dropped.
///
/// # Example
///
/// ```rust,ignore
/// let db = TestDatabaseManager::new_temp();
/// let chunks = db.seed_song("amazing-grace", 3);
/// db.assign_song("singer", "amazing-grace", Utc::now());
///
/// let orchestrator = db.orchestrator();
/// ```
pub struct TestDatabaseManager {
    /// The storage instance
    pub storage: Arc<Storage>,
    /// Temporary directory (kept alive to prevent premature deletion)
    _temp_dir: Option<TempDir>,
    /// Path to the database file
    db_path: PathBuf,
}

impl TestDatabaseManager {
    /// Create a new test database in a temporary directory
    ///
    /// The database is automatically deleted when the manager is dropped.
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test_refrain.db");

        let storage = Storage::new(Some(db_path.clone())).expect("Failed to create test storage");

        Self {
            storage: Arc::new(storage),
            _temp_dir: Some(temp_dir),
            db_path,
        }
    }

    /// Create a test database at a specific path
    ///
    /// The database is NOT automatically deleted.
    pub fn new_at_path(path: PathBuf) -> Self {
        let storage = Storage::new(Some(path.clone())).expect("Failed to create test storage");

        Self {
            storage: Arc::new(storage),
            _temp_dir: None,
            db_path: path,
        }
    }

    /// Get the database path
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Open a second, independent storage on the same file
    pub fn reopen(&self) -> Storage {
        Storage::new(Some(self.db_path.clone())).expect("Failed to reopen test storage")
    }

    /// Orchestrator with default tuning over this database
    pub fn orchestrator(&self) -> SessionOrchestrator<Storage> {
        SessionOrchestrator::new(Arc::clone(&self.storage), ReviewScheduler::default())
    }

    /// Number of progress rows a user has
    pub fn progress_count(&self, user_id: &str) -> usize {
        self.storage
            .list_progress(user_id)
            .map(|rows| rows.len())
            .unwrap_or(0)
    }

    // ========================================================================
    // SEEDING METHODS
    // ========================================================================

    /// Register a song with `chunk_count` chunks, positions 0..n
    pub fn seed_song(&self, song_id: &str, chunk_count: u32) -> Vec<ChunkRef> {
        let chunks = TestDataFactory::song(song_id, chunk_count);
        for chunk in &chunks {
            self.storage
                .register_chunk(chunk)
                .expect("Failed to register chunk");
        }
        chunks
    }

    /// Register the built-in hymn fixture
    pub fn seed_hymn(&self) -> Vec<ChunkRef> {
        let chunks = TestDataFactory::hymn();
        for chunk in &chunks {
            self.storage
                .register_chunk(chunk)
                .expect("Failed to register chunk");
        }
        chunks
    }

    /// Assign every chunk of a song, all due at `now`
    pub fn assign_song(&self, user_id: &str, song_id: &str, now: DateTime<Utc>) -> Vec<ChunkProgress> {
        self.storage
            .assign_song(user_id, song_id, now)
            .expect("Failed to assign song")
    }
}
