//! Study Queue Builder
//!
//! Builds the ordered list of words for one session: due words first, then
//! words never studied. Words scheduled ahead are left out entirely.
//!
//! The queue is built once when a session starts. Ratings applied during the
//! session never re-filter it; the session only advances an index.

use chrono::{DateTime, Utc};

use crate::model::{TopicProgress, VocabularyItem};

/// Build the session queue for a topic.
///
/// Both partitions keep the content source's original order.
pub fn build_queue(
    all_words: &[VocabularyItem],
    progress: &TopicProgress,
    now: DateTime<Utc>,
) -> Vec<VocabularyItem> {
    let mut due = Vec::new();
    let mut fresh = Vec::new();

    for item in all_words {
        match progress.word(&item.id) {
            Some(state) if state.is_due(now) => due.push(item.clone()),
            Some(_) => {}
            None => fresh.push(item.clone()),
        }
    }

    due.extend(fresh);
    due
}
