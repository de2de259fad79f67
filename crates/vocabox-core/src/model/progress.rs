//! Word and topic progress records
//!
//! `WordProgress` is only ever produced by [`crate::schedule::apply_rating`]
//! or [`WordProgress::reset`]; nothing else writes a box value.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Highest Leitner box a word can reach
pub const MAX_BOX: u8 = 5;

// ============================================================================
// WORD PROGRESS
// ============================================================================

/// Learning state for one (user, word) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordProgress {
    /// Leitner box, 0..=5
    #[serde(rename = "box")]
    pub box_level: u8,
    /// When the word becomes due again (derived from the box)
    pub next_review_at: DateTime<Utc>,
    /// When the word was last rated
    pub last_review_at: DateTime<Utc>,
    /// Consecutive non-"again" ratings
    pub streak: u32,
}

impl WordProgress {
    /// The record a reset forces: box 0, due immediately
    pub fn reset(now: DateTime<Utc>) -> Self {
        Self {
            box_level: 0,
            next_review_at: now,
            last_review_at: now,
            streak: 0,
        }
    }

    /// Whether the word is due at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at <= now
    }
}

// ============================================================================
// QUIZ SCORES
// ============================================================================

/// One recorded practice-round score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizScore {
    /// Percentage of correct answers in the round (0-100)
    pub score: u32,
    pub recorded_at: DateTime<Utc>,
}

// ============================================================================
// TOPIC PROGRESS
// ============================================================================

/// Aggregate progress for one (user, topic) pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicProgress {
    /// Word id -> learning state
    pub word_state: HashMap<String, WordProgress>,
    /// Practice round scores, oldest first
    pub quiz_scores: Vec<QuizScore>,
    /// Accumulated study time
    pub study_seconds: u64,
    pub last_studied_at: Option<DateTime<Utc>>,
}

impl TopicProgress {
    /// Look up the state of a single word
    pub fn word(&self, word_id: &str) -> Option<&WordProgress> {
        self.word_state.get(word_id)
    }

    /// Number of words sitting in each box, indexed by box
    pub fn box_distribution(&self) -> [usize; MAX_BOX as usize + 1] {
        let mut counts = [0; MAX_BOX as usize + 1];
        for progress in self.word_state.values() {
            let slot = progress.box_level.min(MAX_BOX) as usize;
            counts[slot] += 1;
        }
        counts
    }

    /// Words already studied that are due at `now`
    pub fn due_count(&self, now: DateTime<Utc>) -> usize {
        self.word_state.values().filter(|p| p.is_due(now)).count()
    }
}
