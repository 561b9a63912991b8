//! SQLite Storage Implementation
//!
//! Chunks, per-user progress rows and the review log.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use super::ProgressStore;
use crate::fade::FadeLevel;
use crate::progress::{ChunkProgress, ChunkRef, DueChunk, RECENT_RATINGS_CAPACITY};
use crate::scheduler::{
    clamp_memory_strength, sanitize_ease_factor, Rating, ReviewResult, DEFAULT_EASE_FACTOR,
    MIN_EASE_FACTOR,
};
use crate::status::{MemoryStatus, MemoryStatusClassifier};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),
    /// Optimistic version check failed
    #[error("Concurrent update: {0}")]
    Conflict(String),
    /// Chunk payload rejected before it reached the database
    #[error("Invalid chunk: {0}")]
    InvalidChunk(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid timestamp
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

// ============================================================================
// RECORDS
// ============================================================================

/// One row of the review log
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLogEntry {
    pub id: i64,
    pub user_id: String,
    pub chunk_id: String,
    pub rating: Rating,
    pub old_status: MemoryStatus,
    pub new_status: MemoryStatus,
    pub old_interval: u32,
    pub new_interval: u32,
    pub old_fade_level: FadeLevel,
    pub new_fade_level: FadeLevel,
    pub xp_earned: u32,
    pub extra_practice: bool,
    pub reviewed_at: DateTime<Utc>,
}

/// Per-user progress summary
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_chunks: usize,
    pub due_now: usize,
    pub by_status: BTreeMap<MemoryStatus, usize>,
    pub average_strength: f64,
    pub total_reviews: u64,
    pub total_xp: u64,
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

// ============================================================================
// STORAGE
// ============================================================================

/// SQLite-backed progress store
///
/// Uses separate reader/writer connections for interior mutability.
/// All methods take `&self`, so the server holds an `Arc<Storage>`.
pub struct Storage {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
    classifier: MemoryStatusClassifier,
}

impl Storage {
    /// Apply PRAGMAs and optional encryption to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        #[cfg(feature = "encryption")]
        {
            if let Ok(key) = std::env::var("REFRAIN_ENCRYPTION_KEY") {
                if !key.is_empty() {
                    conn.pragma_update(None, "key", &key)?;
                }
            }
        }

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        Ok(())
    }

    /// Default database location under the platform data directory
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("app", "refrain", "refrain").ok_or_else(|| {
            StorageError::Init("Could not determine project directories".to_string())
        })?;
        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            let _ = std::fs::set_permissions(data_dir, perms);
        }
        Ok(data_dir.join("refrain.db"))
    }

    /// Create new storage instance with the default status classifier
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        Self::with_classifier(db_path, MemoryStatusClassifier::default())
    }

    /// Create new storage instance that derives status with `classifier`
    pub fn with_classifier(
        db_path: Option<PathBuf>,
        classifier: MemoryStatusClassifier,
    ) -> Result<Self> {
        let path = match db_path {
            Some(p) => {
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                p
            }
            None => Self::default_path()?,
        };

        let writer_conn = Connection::open(&path)?;

        #[cfg(unix)]
        if path.exists() {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&path, perms);
        }

        Self::configure_connection(&writer_conn)?;

        // Apply migrations on writer only
        let applied = super::migrations::apply_migrations(&writer_conn)?;
        tracing::debug!(path = %path.display(), applied, "Opened progress database");

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
            classifier,
        })
    }

    pub fn classifier(&self) -> &MemoryStatusClassifier {
        &self.classifier
    }

    fn lock_writer(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))
    }

    fn lock_reader(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))
    }

    // ========================================================================
    // CHUNKS
    // ========================================================================

    /// Insert or update a chunk. Existing progress rows are kept.
    pub fn register_chunk(&self, chunk: &ChunkRef) -> Result<()> {
        chunk.validate().map_err(StorageError::InvalidChunk)?;
        let lines = serde_json::to_string(&chunk.lines)
            .map_err(|e| StorageError::InvalidChunk(e.to_string()))?;
        let now = format_timestamp(&Utc::now());

        let writer = self.lock_writer()?;
        writer.execute(
            "INSERT INTO chunks (id, song_id, label, position, lines, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                song_id = excluded.song_id,
                label = excluded.label,
                position = excluded.position,
                lines = excluded.lines",
            params![
                chunk.id,
                chunk.song_id,
                chunk.label,
                i64::from(chunk.position),
                lines,
                now
            ],
        )?;

        tracing::debug!(chunk_id = %chunk.id, song_id = %chunk.song_id, "Registered chunk");
        Ok(())
    }

    pub fn get_chunk(&self, chunk_id: &str) -> Result<Option<ChunkRef>> {
        let reader = self.lock_reader()?;
        let chunk = reader
            .query_row(
                "SELECT id, song_id, label, position, lines FROM chunks WHERE id = ?1",
                params![chunk_id],
                |row| Self::row_to_chunk(row, "id"),
            )
            .optional()?;
        Ok(chunk)
    }

    /// Chunks of one song in song order
    pub fn list_song_chunks(&self, song_id: &str) -> Result<Vec<ChunkRef>> {
        let reader = self.lock_reader()?;
        let mut stmt = reader.prepare(
            "SELECT id, song_id, label, position, lines FROM chunks
             WHERE song_id = ?1 ORDER BY position ASC, id ASC",
        )?;
        let chunks = stmt
            .query_map(params![song_id], |row| Self::row_to_chunk(row, "id"))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(chunks)
    }

    /// Delete a chunk together with every user's progress on it
    pub fn remove_chunk(&self, chunk_id: &str) -> Result<bool> {
        let writer = self.lock_writer()?;
        let rows = writer.execute("DELETE FROM chunks WHERE id = ?1", params![chunk_id])?;
        if rows > 0 {
            tracing::info!(chunk_id, "Removed chunk and its progress rows");
        }
        Ok(rows > 0)
    }

    /// Delete all progress for a user. Returns the number of rows removed.
    pub fn remove_user(&self, user_id: &str) -> Result<usize> {
        let writer = self.lock_writer()?;
        let rows = writer.execute(
            "DELETE FROM chunk_progress WHERE user_id = ?1",
            params![user_id],
        )?;
        tracing::info!(user_id, rows, "Removed user progress");
        Ok(rows)
    }

    // ========================================================================
    // PROGRESS
    // ========================================================================

    /// Create the default progress row for every chunk of a song.
    pub fn assign_song(
        &self,
        user_id: &str,
        song_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<ChunkProgress>> {
        let chunks = self.list_song_chunks(song_id)?;
        if chunks.is_empty() {
            return Err(StorageError::NotFound(format!("song {}", song_id)));
        }
        chunks
            .iter()
            .map(|chunk| self.assign_chunk(user_id, &chunk.id, now))
            .collect()
    }

    pub fn user_stats(&self, user_id: &str, now: DateTime<Utc>) -> Result<UserStats> {
        let rows = self.list_progress(user_id)?;

        let mut stats = UserStats {
            total_chunks: rows.len(),
            ..UserStats::default()
        };
        for status in MemoryStatus::all() {
            stats.by_status.insert(status, 0);
        }
        let mut strength_sum = 0.0;
        for p in &rows {
            if p.is_due(now) {
                stats.due_now += 1;
            }
            *stats.by_status.entry(p.status()).or_insert(0) += 1;
            strength_sum += p.memory_strength;
            stats.last_reviewed_at = stats.last_reviewed_at.max(p.last_reviewed_at);
        }
        if !rows.is_empty() {
            stats.average_strength = strength_sum / rows.len() as f64;
        }

        let reader = self.lock_reader()?;
        let (reviews, xp): (i64, i64) = reader.query_row(
            "SELECT COUNT(*), COALESCE(SUM(xp_earned), 0) FROM review_log WHERE user_id = ?1",
            params![user_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        stats.total_reviews = u64::try_from(reviews).unwrap_or(0);
        stats.total_xp = u64::try_from(xp).unwrap_or(0);

        Ok(stats)
    }

    fn query_progress(
        conn: &Connection,
        user_id: &str,
        chunk_id: &str,
    ) -> rusqlite::Result<Option<ChunkProgress>> {
        conn.query_row(
            "SELECT * FROM chunk_progress WHERE user_id = ?1 AND chunk_id = ?2",
            params![user_id, chunk_id],
            Self::row_to_progress,
        )
        .optional()
    }

    // ========================================================================
    // ROW MAPPING
    // ========================================================================

    /// Parse RFC3339 timestamp
    fn parse_timestamp(value: &str, field_name: &str) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(StorageError::InvalidTimestamp(format!(
                        "Invalid {} timestamp '{}': {}",
                        field_name, value, e
                    ))),
                )
            })
    }

    /// Convert a row to ChunkProgress. Corrupt numbers are clamped into range;
    /// status is left for the caller to derive.
    fn row_to_progress(row: &rusqlite::Row) -> rusqlite::Result<ChunkProgress> {
        let user_id: String = row.get("user_id")?;
        let chunk_id: String = row.get("chunk_id")?;
        let created_at: String = row.get("created_at")?;
        let updated_at: String = row.get("updated_at")?;
        let next_review_at: String = row.get("next_review_at")?;
        let last_reviewed_at: Option<String> = row.get("last_reviewed_at")?;
        let ratings_json: String = row.get("recent_ratings")?;

        let mut p = ChunkProgress::new(
            user_id,
            chunk_id,
            Self::parse_timestamp(&created_at, "created_at")?,
        );
        p.fade_level = FadeLevel::clamped(row.get("fade_level")?);
        p.ease_factor = row
            .get::<_, Option<f64>>("ease_factor")?
            .unwrap_or(DEFAULT_EASE_FACTOR);
        p.interval_days = saturating_u32(row.get("interval_days")?);
        p.repetitions = saturating_u32(row.get("repetitions")?);
        p.review_count = saturating_u32(row.get("review_count")?);
        p.next_review_at = Self::parse_timestamp(&next_review_at, "next_review_at")?;
        p.last_reviewed_at = last_reviewed_at
            .map(|s| Self::parse_timestamp(&s, "last_reviewed_at"))
            .transpose()?;
        p.memory_strength = row.get::<_, Option<f64>>("memory_strength")?.unwrap_or(0.0);
        // Unreadable history degrades to none rather than failing the row
        p.recent_ratings = serde_json::from_str(&ratings_json).unwrap_or_default();
        p.updated_at = Self::parse_timestamp(&updated_at, "updated_at")?;
        p.version = row.get("version")?;
        clamp_stored_values(&mut p);
        Ok(p)
    }

    fn row_to_chunk(row: &rusqlite::Row, id_column: &str) -> rusqlite::Result<ChunkRef> {
        let lines_json: String = row.get("lines")?;
        let lines: Vec<Vec<String>> = serde_json::from_str(&lines_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;
        Ok(ChunkRef {
            id: row.get(id_column)?,
            song_id: row.get("song_id")?,
            label: row.get("label")?,
            position: saturating_u32(row.get("position")?),
            lines,
        })
    }

    fn row_to_log_entry(row: &rusqlite::Row) -> rusqlite::Result<ReviewLogEntry> {
        let rating: String = row.get("rating")?;
        let old_status: String = row.get("old_status")?;
        let new_status: String = row.get("new_status")?;
        let reviewed_at: String = row.get("reviewed_at")?;
        Ok(ReviewLogEntry {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            chunk_id: row.get("chunk_id")?,
            rating: rating.parse().map_err(|e: crate::Error| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            old_status: MemoryStatus::parse_name(&old_status),
            new_status: MemoryStatus::parse_name(&new_status),
            old_interval: saturating_u32(row.get("old_interval")?),
            new_interval: saturating_u32(row.get("new_interval")?),
            old_fade_level: FadeLevel::clamped(row.get("old_fade_level")?),
            new_fade_level: FadeLevel::clamped(row.get("new_fade_level")?),
            xp_earned: saturating_u32(row.get("xp_earned")?),
            extra_practice: row.get("extra_practice")?,
            reviewed_at: Self::parse_timestamp(&reviewed_at, "reviewed_at")?,
        })
    }
}

// ============================================================================
// PROGRESS STORE
// ============================================================================

impl ProgressStore for Storage {
    fn get_progress(&self, user_id: &str, chunk_id: &str) -> Result<Option<ChunkProgress>> {
        let reader = self.lock_reader()?;
        let progress = Self::query_progress(&reader, user_id, chunk_id)?;
        Ok(progress.map(|p| p.with_refreshed_status(&self.classifier)))
    }

    fn due_progress(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<DueChunk>> {
        let reader = self.lock_reader()?;
        let mut stmt = reader.prepare(
            "SELECT p.*, c.song_id, c.label, c.position, c.lines
             FROM chunk_progress p
             JOIN chunks c ON c.id = p.chunk_id
             WHERE p.user_id = ?1 AND p.next_review_at <= ?2
             ORDER BY p.next_review_at ASC, c.position ASC, c.song_id ASC, c.id ASC",
        )?;

        let due = stmt
            .query_map(params![user_id, format_timestamp(&now)], |row| {
                Ok(DueChunk {
                    progress: Self::row_to_progress(row)?,
                    chunk: Self::row_to_chunk(row, "chunk_id")?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(due
            .into_iter()
            .map(|mut d| {
                d.progress.refresh_status(&self.classifier);
                d
            })
            .collect())
    }

    fn save_review(&self, result: &ReviewResult, xp_earned: u32) -> Result<ChunkProgress> {
        let mut saved = result.progress.clone();
        clamp_stored_values(&mut saved);
        // Return exactly what a later read would see
        saved.next_review_at = stored_precision(saved.next_review_at);
        saved.last_reviewed_at = saved.last_reviewed_at.map(stored_precision);
        saved.created_at = stored_precision(saved.created_at);
        saved.updated_at = stored_precision(saved.updated_at);
        saved.refresh_status(&self.classifier);
        let expected_version = saved.version;
        let ratings = serde_json::to_string(&saved.recent_ratings)
            .map_err(|e| StorageError::Init(format!("Failed to encode ratings: {}", e)))?;

        let mut writer = self.lock_writer()?;
        let tx = writer.transaction()?;

        let old: Option<(i64, i64)> = tx
            .query_row(
                "SELECT interval_days, fade_level FROM chunk_progress
                 WHERE user_id = ?1 AND chunk_id = ?2",
                params![saved.user_id, saved.chunk_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((old_interval, old_fade_level)) = old else {
            return Err(StorageError::NotFound(format!(
                "progress {}/{}",
                saved.user_id, saved.chunk_id
            )));
        };

        let rows = tx.execute(
            "UPDATE chunk_progress SET
                fade_level = ?1,
                ease_factor = ?2,
                interval_days = ?3,
                repetitions = ?4,
                review_count = ?5,
                next_review_at = ?6,
                last_reviewed_at = ?7,
                memory_strength = ?8,
                recent_ratings = ?9,
                status = ?10,
                updated_at = ?11,
                version = version + 1
             WHERE user_id = ?12 AND chunk_id = ?13 AND version = ?14",
            params![
                i64::from(saved.fade_level.get()),
                saved.ease_factor,
                i64::from(saved.interval_days),
                i64::from(saved.repetitions),
                i64::from(saved.review_count),
                format_timestamp(&saved.next_review_at),
                saved.last_reviewed_at.as_ref().map(format_timestamp),
                saved.memory_strength,
                ratings,
                saved.status().as_str(),
                format_timestamp(&saved.updated_at),
                saved.user_id,
                saved.chunk_id,
                expected_version,
            ],
        )?;

        if rows == 0 {
            tracing::warn!(
                user_id = %saved.user_id,
                chunk_id = %saved.chunk_id,
                expected_version,
                "Progress row changed since it was read"
            );
            return Err(StorageError::Conflict(format!(
                "progress {}/{} is no longer at version {}",
                saved.user_id, saved.chunk_id, expected_version
            )));
        }

        tx.execute(
            "INSERT INTO review_log (
                user_id, chunk_id, rating, old_status, new_status,
                old_interval, new_interval, old_fade_level, new_fade_level,
                xp_earned, extra_practice, reviewed_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                saved.user_id,
                saved.chunk_id,
                result.rating.as_str(),
                result.previous_status.as_str(),
                saved.status().as_str(),
                old_interval,
                i64::from(saved.interval_days),
                old_fade_level,
                i64::from(saved.fade_level.get()),
                i64::from(xp_earned),
                result.extra_practice,
                format_timestamp(&saved.updated_at),
            ],
        )?;

        tx.commit()?;

        saved.version = expected_version + 1;
        Ok(saved)
    }

    fn get_chunk(&self, chunk_id: &str) -> Result<Option<ChunkRef>> {
        Storage::get_chunk(self, chunk_id)
    }

    fn assign_chunk(
        &self,
        user_id: &str,
        chunk_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ChunkProgress> {
        let writer = self.lock_writer()?;

        let chunk_exists: bool = writer
            .query_row(
                "SELECT 1 FROM chunks WHERE id = ?1",
                params![chunk_id],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if !chunk_exists {
            return Err(StorageError::NotFound(format!("chunk {}", chunk_id)));
        }

        let fresh = ChunkProgress::new(user_id, chunk_id, now).with_refreshed_status(&self.classifier);
        let inserted = writer.execute(
            "INSERT OR IGNORE INTO chunk_progress (
                user_id, chunk_id, fade_level, ease_factor, interval_days, repetitions,
                review_count, next_review_at, last_reviewed_at, memory_strength,
                recent_ratings, status, created_at, updated_at, version
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, ?9, '[]', ?10, ?11, ?12, 0)",
            params![
                fresh.user_id,
                fresh.chunk_id,
                i64::from(fresh.fade_level.get()),
                fresh.ease_factor,
                i64::from(fresh.interval_days),
                i64::from(fresh.repetitions),
                i64::from(fresh.review_count),
                format_timestamp(&fresh.next_review_at),
                fresh.memory_strength,
                fresh.status().as_str(),
                format_timestamp(&fresh.created_at),
                format_timestamp(&fresh.updated_at),
            ],
        )?;
        if inserted > 0 {
            tracing::info!(user_id, chunk_id, "Assigned chunk");
        }

        let progress = Self::query_progress(&writer, user_id, chunk_id)?.ok_or_else(|| {
            StorageError::NotFound(format!("progress {}/{}", user_id, chunk_id))
        })?;
        Ok(progress.with_refreshed_status(&self.classifier))
    }

    fn list_progress(&self, user_id: &str) -> Result<Vec<ChunkProgress>> {
        let reader = self.lock_reader()?;
        let mut stmt = reader.prepare(
            "SELECT p.* FROM chunk_progress p
             JOIN chunks c ON c.id = p.chunk_id
             WHERE p.user_id = ?1
             ORDER BY c.song_id ASC, c.position ASC, c.id ASC",
        )?;
        let rows = stmt
            .query_map(params![user_id], Self::row_to_progress)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows
            .into_iter()
            .map(|p| p.with_refreshed_status(&self.classifier))
            .collect())
    }

    fn review_history(
        &self,
        user_id: &str,
        chunk_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ReviewLogEntry>> {
        let reader = self.lock_reader()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = reader.prepare(
            "SELECT * FROM review_log
             WHERE user_id = ?1 AND (?2 IS NULL OR chunk_id = ?2)
             ORDER BY reviewed_at DESC, id DESC
             LIMIT ?3",
        )?;
        let entries = stmt
            .query_map(params![user_id, chunk_id, limit], Self::row_to_log_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }
}

/// Fixed-width UTC timestamps keep text ordering equal to time ordering.
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Range invariants every stored and returned record satisfies
fn clamp_stored_values(p: &mut ChunkProgress) {
    p.ease_factor = sanitize_ease_factor(p.ease_factor, MIN_EASE_FACTOR, DEFAULT_EASE_FACTOR);
    p.memory_strength = clamp_memory_strength(p.memory_strength);
    p.interval_days = p.interval_days.max(1);
    if p.recent_ratings.len() > RECENT_RATINGS_CAPACITY {
        let excess = p.recent_ratings.len() - RECENT_RATINGS_CAPACITY;
        p.recent_ratings.drain(..excess);
    }
}

fn stored_precision(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.trunc_subsecs(6)
}

fn saturating_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

// ============================================================================
// TESTS
// ============================================================================
