//! Practice Batch Generator
//!
//! Verification exercises for words whose positive rating is still pending:
//! - **Multiple choice**: show the word, pick its meaning among distractors
//!   drawn from the same topic
//! - **Listening**: the word is spoken aloud, the user types it back
//!
//! All randomness goes through the caller's RNG so tests can seed it.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::VocabularyItem;

/// Kind of verification exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    MultipleChoice,
    Listening,
}

/// A prepared exercise for one batch entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Exercise {
    MultipleChoice {
        word_id: String,
        /// The word shown as the question
        prompt: String,
        /// Shuffled meanings, exactly one correct
        options: Vec<String>,
        answer_index: usize,
    },
    Listening {
        word_id: String,
        /// Spoken, not shown
        word: String,
    },
}

/// A user's response to an exercise
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Index into the multiple-choice options
    Choice(usize),
    /// Free text typed for a listening exercise
    Typed(String),
}

impl Exercise {
    pub fn kind(&self) -> ExerciseKind {
        match self {
            Exercise::MultipleChoice { .. } => ExerciseKind::MultipleChoice,
            Exercise::Listening { .. } => ExerciseKind::Listening,
        }
    }

    pub fn word_id(&self) -> &str {
        match self {
            Exercise::MultipleChoice { word_id, .. } | Exercise::Listening { word_id, .. } => {
                word_id
            }
        }
    }

    /// Grade an answer. Mismatched answer shapes are simply wrong.
    pub fn grade(&self, answer: &Answer) -> bool {
        match (self, answer) {
            (Exercise::MultipleChoice { answer_index, .. }, Answer::Choice(choice)) => {
                choice == answer_index
            }
            (Exercise::Listening { word, .. }, Answer::Typed(typed)) => {
                normalize(typed) == normalize(word)
            }
            _ => false,
        }
    }
}

/// Dictation comparison: trimmed, lowercased, otherwise exact
fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Pick an exercise kind with equal probability
pub fn pick_exercise_kind<R: Rng + ?Sized>(rng: &mut R) -> ExerciseKind {
    if rng.gen_bool(0.5) {
        ExerciseKind::MultipleChoice
    } else {
        ExerciseKind::Listening
    }
}

/// Sample up to `n` distinct wrong meanings from the rest of the topic.
///
/// The target's own meaning and repeated meanings are never offered.
pub fn build_distractors<R: Rng + ?Sized>(
    word: &VocabularyItem,
    topic_words: &[VocabularyItem],
    n: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(word.meaning.as_str());

    let candidates: Vec<&str> = topic_words
        .iter()
        .filter(|other| other.id != word.id)
        .map(|other| other.meaning.as_str())
        .filter(|meaning| seen.insert(*meaning))
        .collect();

    candidates
        .choose_multiple(rng, n)
        .map(|meaning| meaning.to_string())
        .collect()
}

/// Build the exercise for a pending word
pub fn build_exercise<R: Rng + ?Sized>(
    word: &VocabularyItem,
    topic_words: &[VocabularyItem],
    distractor_count: usize,
    rng: &mut R,
) -> Exercise {
    match pick_exercise_kind(rng) {
        ExerciseKind::MultipleChoice => {
            let mut options = build_distractors(word, topic_words, distractor_count, rng);
            options.push(word.meaning.clone());
            options.shuffle(rng);
            let answer_index = options
                .iter()
                .position(|option| *option == word.meaning)
                .unwrap_or_default();

            Exercise::MultipleChoice {
                word_id: word.id.clone(),
                prompt: word.word.clone(),
                options,
                answer_index,
            }
        }
        ExerciseKind::Listening => Exercise::Listening {
            word_id: word.id.clone(),
            word: word.word.clone(),
        },
    }
}
