//! Database Migrations
//!
//! Schema migration definitions for the storage layer.

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: chunks and per-user chunk progress",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Review log for history, XP totals and status transitions",
        up: MIGRATION_V2_UP,
    },
];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number
    pub version: u32,
    /// Description
    pub description: &'static str,
    /// SQL to apply
    pub up: &'static str,
}

/// V1: Initial schema
const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

-- Lyric chunks, as registered by the lyrics side
CREATE TABLE IF NOT EXISTS chunks (
    id TEXT PRIMARY KEY,
    song_id TEXT NOT NULL,
    label TEXT NOT NULL,
    position INTEGER NOT NULL DEFAULT 0,
    lines TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chunks_song ON chunks(song_id, position);

-- One scheduling record per (user, chunk)
CREATE TABLE IF NOT EXISTS chunk_progress (
    user_id TEXT NOT NULL,
    chunk_id TEXT NOT NULL REFERENCES chunks(id) ON DELETE CASCADE,

    -- Recall aid
    fade_level INTEGER NOT NULL DEFAULT 0,

    -- SM-2 state
    ease_factor REAL NOT NULL DEFAULT 2.5,
    interval_days INTEGER NOT NULL DEFAULT 1,
    repetitions INTEGER NOT NULL DEFAULT 0,
    review_count INTEGER NOT NULL DEFAULT 0,
    next_review_at TEXT NOT NULL,
    last_reviewed_at TEXT,

    -- Memory model
    memory_strength REAL NOT NULL DEFAULT 0.0,
    recent_ratings TEXT NOT NULL DEFAULT '[]',

    -- Cached projection, recomputed on every write and on read
    status TEXT NOT NULL DEFAULT 'fragile',

    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    version INTEGER NOT NULL DEFAULT 0,

    PRIMARY KEY (user_id, chunk_id)
);

CREATE INDEX IF NOT EXISTS idx_progress_due ON chunk_progress(user_id, next_review_at);
CREATE INDEX IF NOT EXISTS idx_progress_chunk ON chunk_progress(chunk_id);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// V2: Review log
const MIGRATION_V2_UP: &str = r#"
CREATE TABLE IF NOT EXISTS review_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    chunk_id TEXT NOT NULL,
    rating TEXT NOT NULL,
    old_status TEXT NOT NULL,
    new_status TEXT NOT NULL,
    old_interval INTEGER NOT NULL,
    new_interval INTEGER NOT NULL,
    old_fade_level INTEGER NOT NULL,
    new_fade_level INTEGER NOT NULL,
    xp_earned INTEGER NOT NULL DEFAULT 0,
    extra_practice INTEGER NOT NULL DEFAULT 0,
    reviewed_at TEXT NOT NULL,
    FOREIGN KEY (user_id, chunk_id)
        REFERENCES chunk_progress(user_id, chunk_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_review_log_user ON review_log(user_id, reviewed_at);
CREATE INDEX IF NOT EXISTS idx_review_log_chunk ON review_log(user_id, chunk_id);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (2, datetime('now'));
"#;

/// Get current schema version from database
pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .or(Ok(0))
}

/// Apply pending migrations
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                "Applying migration v{}: {}",
                migration.version,
                migration.description
            );

            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}
