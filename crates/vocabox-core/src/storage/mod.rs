//! Storage Module
//!
//! The progress store contract plus two implementations:
//! - In-memory store for tests and ephemeral sessions
//! - SQLite store with one row per (user, topic, word), so each rating is an
//!   atomic upsert of that row and never rewrites sibling words

mod memory;
mod migrations;
mod sqlite;

use chrono::{DateTime, Utc};

use crate::model::{QuizScore, TopicProgress, WordProgress};

pub use memory::MemoryStore;
pub use migrations::MIGRATIONS;
pub use sqlite::SqliteStore;

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
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid timestamp
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
    /// Backend refused or failed the write
    #[error("Write failed: {0}")]
    Write(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

// ============================================================================
// PROGRESS STORE CONTRACT
// ============================================================================

/// Durable per-user, per-topic progress.
///
/// Every write is an upsert keyed by `(user_id, topic_id)` that touches only
/// the fields it names. Implementations are responsible for making each call
/// atomic on its own.
pub trait ProgressStore: Send + Sync {
    /// Snapshot of a topic's progress; empty when nothing was stored yet
    fn load(&self, user_id: &str, topic_id: &str) -> Result<TopicProgress>;

    /// Merge-write the state of a single word
    fn commit_rating(
        &self,
        user_id: &str,
        topic_id: &str,
        word_id: &str,
        progress: &WordProgress,
    ) -> Result<()>;

    /// Append a practice-round score
    fn commit_quiz_score(&self, user_id: &str, topic_id: &str, score: QuizScore) -> Result<()>;

    /// Add study time
    fn commit_time_increment(
        &self,
        user_id: &str,
        topic_id: &str,
        seconds: u64,
        at: DateTime<Utc>,
    ) -> Result<()>;

    /// Force a word back to box 0, due at `now`
    fn reset_word(
        &self,
        user_id: &str,
        topic_id: &str,
        word_id: &str,
        now: DateTime<Utc>,
    ) -> Result<()>;
}
