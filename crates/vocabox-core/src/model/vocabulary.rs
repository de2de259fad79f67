//! Vocabulary Item - The unit of study content
//!
//! Items come from the content source and are never mutated by the
//! scheduler. Field names serialize in camelCase so vocabulary files
//! line up with the records the content collaborator publishes.

use serde::{Deserialize, Serialize};

/// A single vocabulary flashcard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyItem {
    /// Stable identifier, unique within the content source
    pub id: String,
    /// The word shown on the front of the card
    pub word: String,
    /// IPA or respelling
    #[serde(default)]
    pub pronunciation: String,
    /// Part of speech (noun, verb, adj, ...)
    #[serde(default)]
    pub part_of_speech: String,
    /// Meaning shown on the back of the card and used as the quiz answer
    pub meaning: String,
    /// Difficulty level label (A1..C2 or similar)
    #[serde(default)]
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub antonyms: Option<String>,
    /// Topic this word belongs to
    pub topic_id: String,
}

impl VocabularyItem {
    /// Create an item with only the fields the scheduler relies on
    pub fn new(
        id: impl Into<String>,
        word: impl Into<String>,
        meaning: impl Into<String>,
        topic_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            word: word.into(),
            pronunciation: String::new(),
            part_of_speech: String::new(),
            meaning: meaning.into(),
            level: String::new(),
            synonyms: None,
            antonyms: None,
            topic_id: topic_id.into(),
        }
    }
}
