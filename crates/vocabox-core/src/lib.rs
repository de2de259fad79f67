//! # Vocabox Core
//!
//! Leitner-box scheduling for vocabulary study:
//!
//! - **Boxes 0..5**: each word sits in a box whose interval sets its next review
//! - **Study queue**: due words first, then never-seen words, in content order
//! - **Deferred batches**: good/easy ratings wait for a practice exercise before
//!   they are saved; a wrong answer saves "again" instead
//! - **Progress store**: per-word upserts, quiz scores and study time, in memory
//!   or in SQLite
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vocabox_core::prelude::*;
//!
//! let store = Arc::new(SqliteStore::open(None)?);
//! let content = JsonContentSource::new("vocabulary.json");
//! let mut session = StudySession::start(
//!     SessionRequest::new("alice", "animals"),
//!     &content,
//!     SessionServices::new(store),
//!     SchedulerConfig::default(),
//! )?;
//!
//! session.flip();
//! session.rate(Rating::Good);
//! ```
//!
//! ## Feature Flags
//!
//! - `bundled-sqlite` (default): compile SQLite into the binary

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod capabilities;
pub mod clock;
pub mod config;
pub mod content;
pub mod model;
pub mod practice;
pub mod queue;
pub mod schedule;
pub mod session;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Data model
pub use model::{QuizScore, TopicProgress, VocabularyItem, WordProgress, MAX_BOX};

// Leitner scheduling
pub use queue::build_queue;
pub use schedule::{apply_rating, interval_for, Rating, OVERFLOW_INTERVAL_DAYS};

// Practice exercises
pub use practice::{
    build_distractors, build_exercise, pick_exercise_kind, Answer, Exercise, ExerciseKind,
};

// Sessions
pub use session::{
    reduce, spawn_session, BreakKind, Effect, PendingEntry, ReduceContext, SessionCommand,
    SessionError, SessionEvent, SessionHandle, SessionPhase, SessionRequest, SessionServices,
    SessionSnapshot, SessionSummary, StudySession, Transition,
};

// Collaborators
pub use capabilities::{AudioCues, CapabilityError, Cue, Silent, Speech};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, SchedulerConfig};
pub use content::{ContentError, ContentSource, JsonContentSource, StaticContent};

// Storage layer
pub use storage::{MemoryStore, ProgressStore, Result, SqliteStore, StorageError};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        Answer, Clock, ContentSource, Exercise, JsonContentSource, MemoryStore, ProgressStore,
        Rating, SchedulerConfig, SessionCommand, SessionRequest, SessionServices, SqliteStore,
        StudySession, TopicProgress, VocabularyItem, WordProgress,
    };
}
