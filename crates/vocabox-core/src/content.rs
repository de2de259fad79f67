//! Vocabulary content source
//!
//! The scheduler never owns content. It asks a [`ContentSource`] for a
//! topic's words once per session.

use std::path::PathBuf;

use crate::model::VocabularyItem;

/// Content retrieval error
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed vocabulary data: {0}")]
    Parse(#[from] serde_json::Error),
    /// Backend could not serve the request
    #[error("Content unavailable: {0}")]
    Unavailable(String),
}

/// Provider of vocabulary lists
pub trait ContentSource: Send + Sync {
    /// All words of a topic, in content order
    fn list_vocabulary(&self, topic_id: &str) -> Result<Vec<VocabularyItem>, ContentError>;
}

/// Fixed in-memory word list
#[derive(Debug, Clone, Default)]
pub struct StaticContent {
    items: Vec<VocabularyItem>,
}

impl StaticContent {
    pub fn new(items: Vec<VocabularyItem>) -> Self {
        Self { items }
    }
}

impl ContentSource for StaticContent {
    fn list_vocabulary(&self, topic_id: &str) -> Result<Vec<VocabularyItem>, ContentError> {
        Ok(self
            .items
            .iter()
            .filter(|item| item.topic_id == topic_id)
            .cloned()
            .collect())
    }
}

/// Vocabulary read from a JSON file holding an array of items.
///
/// The file is re-read on every call so edits show up in the next session.
#[derive(Debug, Clone)]
pub struct JsonContentSource {
    path: PathBuf,
}

impl JsonContentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ContentSource for JsonContentSource {
    fn list_vocabulary(&self, topic_id: &str) -> Result<Vec<VocabularyItem>, ContentError> {
        let raw = std::fs::read_to_string(&self.path)?;
        let items: Vec<VocabularyItem> = serde_json::from_str(&raw)?;
        Ok(items
            .into_iter()
            .filter(|item| item.topic_id == topic_id)
            .collect())
    }
}
