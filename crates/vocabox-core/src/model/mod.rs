//! Model module - Core types and data structures
//!
//! Implements the vocabulary study model with:
//! - Read-only vocabulary items owned by the content source
//! - Per-word Leitner box state
//! - Per-topic aggregates (word states, quiz history, study time)

mod progress;
mod vocabulary;

pub use progress::{QuizScore, TopicProgress, WordProgress, MAX_BOX};
pub use vocabulary::VocabularyItem;
