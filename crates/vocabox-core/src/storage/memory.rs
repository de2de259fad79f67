//! In-memory progress store

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::{ProgressStore, Result, StorageError};
use crate::model::{QuizScore, TopicProgress, WordProgress};

type TopicKey = (String, String);

/// Progress kept in a mutex-guarded map. Lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    topics: Mutex<HashMap<TopicKey, TopicProgress>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the topic record, creating it if absent
    fn update<F>(&self, user_id: &str, topic_id: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut TopicProgress),
    {
        let mut topics = self
            .topics
            .lock()
            .map_err(|_| StorageError::Init("Progress lock poisoned".into()))?;
        let record = topics
            .entry((user_id.to_string(), topic_id.to_string()))
            .or_default();
        f(record);
        Ok(())
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self, user_id: &str, topic_id: &str) -> Result<TopicProgress> {
        let topics = self
            .topics
            .lock()
            .map_err(|_| StorageError::Init("Progress lock poisoned".into()))?;
        Ok(topics
            .get(&(user_id.to_string(), topic_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn commit_rating(
        &self,
        user_id: &str,
        topic_id: &str,
        word_id: &str,
        progress: &WordProgress,
    ) -> Result<()> {
        self.update(user_id, topic_id, |record| {
            record.word_state.insert(word_id.to_string(), *progress);
            record.last_studied_at = Some(progress.last_review_at);
        })
    }

    fn commit_quiz_score(&self, user_id: &str, topic_id: &str, score: QuizScore) -> Result<()> {
        self.update(user_id, topic_id, |record| record.quiz_scores.push(score))
    }

    fn commit_time_increment(
        &self,
        user_id: &str,
        topic_id: &str,
        seconds: u64,
        at: DateTime<Utc>,
    ) -> Result<()> {
        self.update(user_id, topic_id, |record| {
            record.study_seconds += seconds;
            record.last_studied_at = Some(at);
        })
    }

    fn reset_word(
        &self,
        user_id: &str,
        topic_id: &str,
        word_id: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.update(user_id, topic_id, |record| {
            record
                .word_state
                .insert(word_id.to_string(), WordProgress::reset(now));
        })
    }
}
