//! SQLite Progress Store
//!
//! Durable implementation of [`ProgressStore`]. Word state lives in its own
//! row per (user, topic, word) so two sessions rating different words of the
//! same topic never overwrite each other.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};

use super::{ProgressStore, Result, StorageError};
use crate::model::{QuizScore, TopicProgress, WordProgress};

/// SQLite-backed progress store
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Apply PRAGMAs to a fresh connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }

    /// Default database location under the platform data directory
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "vocabox", "vocabox").ok_or_else(|| {
            StorageError::Init("Could not determine project directories".to_string())
        })?;
        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        Ok(data_dir.join("progress.db"))
    }

    /// Open (or create) the store. `None` uses [`SqliteStore::default_path`].
    pub fn open(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => Self::default_path()?,
        };

        let conn = Connection::open(&path)?;
        Self::configure_connection(&conn)?;
        let applied = super::migrations::apply_migrations(&conn)?;
        tracing::debug!("Progress store at {} ({} migrations applied)", path.display(), applied);

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path),
        })
    }

    /// Throwaway database, for tests and dry runs
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        super::migrations::apply_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// File backing this store, if any
    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Init("Connection lock poisoned".into()))
    }

    fn parse_timestamp(value: &str, field_name: &str) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("Invalid {} timestamp '{}': {}", field_name, value, e),
                    )),
                )
            })
    }

    fn row_to_word(row: &rusqlite::Row) -> rusqlite::Result<(String, WordProgress)> {
        let word_id: String = row.get("word_id")?;
        let next_review_at: String = row.get("next_review_at")?;
        let last_review_at: String = row.get("last_review_at")?;
        Ok((
            word_id,
            WordProgress {
                box_level: row.get("box")?,
                next_review_at: Self::parse_timestamp(&next_review_at, "next_review_at")?,
                last_review_at: Self::parse_timestamp(&last_review_at, "last_review_at")?,
                streak: row.get("streak")?,
            },
        ))
    }

    fn upsert_word(
        conn: &Connection,
        user_id: &str,
        topic_id: &str,
        word_id: &str,
        progress: &WordProgress,
    ) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT INTO word_progress
                (user_id, topic_id, word_id, box, next_review_at, last_review_at, streak)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(user_id, topic_id, word_id) DO UPDATE SET
                box = excluded.box,
                next_review_at = excluded.next_review_at,
                last_review_at = excluded.last_review_at,
                streak = excluded.streak",
            params![
                user_id,
                topic_id,
                word_id,
                progress.box_level,
                progress.next_review_at.to_rfc3339(),
                progress.last_review_at.to_rfc3339(),
                progress.streak,
            ],
        )?;
        Ok(())
    }

    fn touch_topic(
        conn: &Connection,
        user_id: &str,
        topic_id: &str,
        seconds: i64,
        at: DateTime<Utc>,
    ) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT INTO topic_progress (user_id, topic_id, study_seconds, last_studied_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, topic_id) DO UPDATE SET
                study_seconds = study_seconds + excluded.study_seconds,
                last_studied_at = excluded.last_studied_at",
            params![user_id, topic_id, seconds, at.to_rfc3339()],
        )?;
        Ok(())
    }
}

impl ProgressStore for SqliteStore {
    fn load(&self, user_id: &str, topic_id: &str) -> Result<TopicProgress> {
        let conn = self.lock()?;
        let mut progress = TopicProgress::default();

        let mut stmt = conn.prepare(
            "SELECT word_id, box, next_review_at, last_review_at, streak
             FROM word_progress WHERE user_id = ?1 AND topic_id = ?2",
        )?;
        let words = stmt.query_map(params![user_id, topic_id], Self::row_to_word)?;
        for word in words {
            let (word_id, state) = word?;
            progress.word_state.insert(word_id, state);
        }

        let mut stmt = conn.prepare(
            "SELECT score, recorded_at FROM quiz_scores
             WHERE user_id = ?1 AND topic_id = ?2 ORDER BY id ASC",
        )?;
        let scores = stmt.query_map(params![user_id, topic_id], |row| {
            let recorded_at: String = row.get(1)?;
            Ok(QuizScore {
                score: row.get(0)?,
                recorded_at: Self::parse_timestamp(&recorded_at, "recorded_at")?,
            })
        })?;
        for score in scores {
            progress.quiz_scores.push(score?);
        }

        let totals: Option<(i64, Option<String>)> = conn
            .query_row(
                "SELECT study_seconds, last_studied_at FROM topic_progress
                 WHERE user_id = ?1 AND topic_id = ?2",
                params![user_id, topic_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        if let Some((seconds, last_studied_at)) = totals {
            progress.study_seconds = seconds.max(0) as u64;
            progress.last_studied_at = last_studied_at
                .map(|s| {
                    DateTime::parse_from_rfc3339(&s)
                        .map(|dt| dt.with_timezone(&Utc))
                        .map_err(|e| StorageError::InvalidTimestamp(format!("{}: {}", s, e)))
                })
                .transpose()?;
        }

        Ok(progress)
    }

    fn commit_rating(
        &self,
        user_id: &str,
        topic_id: &str,
        word_id: &str,
        progress: &WordProgress,
    ) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        Self::upsert_word(&tx, user_id, topic_id, word_id, progress)?;
        Self::touch_topic(&tx, user_id, topic_id, 0, progress.last_review_at)?;
        tx.commit()?;
        Ok(())
    }

    fn commit_quiz_score(&self, user_id: &str, topic_id: &str, score: QuizScore) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO quiz_scores (user_id, topic_id, score, recorded_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, topic_id, score.score, score.recorded_at.to_rfc3339()],
        )?;
        Ok(())
    }

    fn commit_time_increment(
        &self,
        user_id: &str,
        topic_id: &str,
        seconds: u64,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let seconds = i64::try_from(seconds)
            .map_err(|_| StorageError::Write(format!("Time increment too large: {}", seconds)))?;
        let conn = self.lock()?;
        Self::touch_topic(&conn, user_id, topic_id, seconds, at)?;
        Ok(())
    }

    fn reset_word(
        &self,
        user_id: &str,
        topic_id: &str,
        word_id: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.lock()?;
        Self::upsert_word(&conn, user_id, topic_id, word_id, &WordProgress::reset(now))?;
        Ok(())
    }
}
