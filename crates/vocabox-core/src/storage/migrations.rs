//! Database Migrations
//!
//! Schema migration definitions for the progress store.

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: word progress, topic totals, quiz scores",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Due-word lookup index",
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

-- One row per (user, topic, word): a rating rewrites only its own row
CREATE TABLE IF NOT EXISTS word_progress (
    user_id TEXT NOT NULL,
    topic_id TEXT NOT NULL,
    word_id TEXT NOT NULL,
    box INTEGER NOT NULL DEFAULT 0 CHECK (box BETWEEN 0 AND 5),
    next_review_at TEXT NOT NULL,
    last_review_at TEXT NOT NULL,
    streak INTEGER NOT NULL DEFAULT 0 CHECK (streak >= 0),
    PRIMARY KEY (user_id, topic_id, word_id)
);

CREATE TABLE IF NOT EXISTS topic_progress (
    user_id TEXT NOT NULL,
    topic_id TEXT NOT NULL,
    study_seconds INTEGER NOT NULL DEFAULT 0,
    last_studied_at TEXT,
    PRIMARY KEY (user_id, topic_id)
);

CREATE TABLE IF NOT EXISTS quiz_scores (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    topic_id TEXT NOT NULL,
    score INTEGER NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_quiz_scores_topic ON quiz_scores(user_id, topic_id, id);

INSERT INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// V2: Due lookups scan by next review time
const MIGRATION_V2_UP: &str = r#"
CREATE INDEX IF NOT EXISTS idx_word_progress_due
    ON word_progress(user_id, topic_id, next_review_at);

UPDATE schema_version SET version = 2, applied_at = datetime('now');
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
