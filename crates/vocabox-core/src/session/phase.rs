//! Session phase machine
//!
//! ```text
//!            rate x N            countdown / skip
//! Learning ───────────► Break ──────────────────► Practice
//!    ▲                                               │
//!    └──────────────── batch resolved ───────────────┘
//!    │
//!    └── queue exhausted, nothing pending ──► Finished
//! ```
//!
//! [`reduce`] is pure: it takes the current phase and an event and returns
//! the next phase plus the side effects the controller must perform, in
//! order. It never touches storage, sound, randomness or the clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capabilities::Cue;
use crate::config::SchedulerConfig;
use crate::model::VocabularyItem;
use crate::schedule::Rating;

// ============================================================================
// PHASE DATA
// ============================================================================

/// A word whose good/easy rating waits for practice confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingEntry {
    pub item: VocabularyItem,
    /// Only `Good` or `Easy`
    pub rating: Rating,
}

/// Which break is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakKind {
    /// After a full batch
    Long,
    /// Before the trailing batch at the end of the queue
    Short,
}

/// Where a session is. Each variant carries exactly the data valid in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Learning {
        /// Position of the current word in the queue
        index: usize,
        batch: Vec<PendingEntry>,
    },
    Break {
        /// Queue position learning resumes at
        index: usize,
        batch: Vec<PendingEntry>,
        kind: BreakKind,
        deadline: DateTime<Utc>,
    },
    Practice {
        index: usize,
        /// Frozen for the whole round
        batch: Vec<PendingEntry>,
        practice_index: usize,
        score: usize,
        /// Set while answer feedback is on screen
        feedback_until: Option<DateTime<Utc>>,
    },
    Finished {
        /// Queue words the session got through
        processed: usize,
        abandoned: bool,
    },
}

impl SessionPhase {
    /// Starting phase for a queue of `queue_len` words
    pub fn initial(queue_len: usize) -> Self {
        if queue_len == 0 {
            SessionPhase::Finished {
                processed: 0,
                abandoned: false,
            }
        } else {
            SessionPhase::Learning {
                index: 0,
                batch: Vec::new(),
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionPhase::Learning { .. } => "learning",
            SessionPhase::Break { .. } => "break",
            SessionPhase::Practice { .. } => "practice",
            SessionPhase::Finished { .. } => "finished",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, SessionPhase::Finished { .. })
    }

    /// The study-time ticker only runs while learning or practicing
    pub fn counts_study_time(&self) -> bool {
        matches!(
            self,
            SessionPhase::Learning { .. } | SessionPhase::Practice { .. }
        )
    }

    /// Queue position (processed count once finished)
    pub fn index(&self) -> usize {
        match self {
            SessionPhase::Learning { index, .. }
            | SessionPhase::Break { index, .. }
            | SessionPhase::Practice { index, .. } => *index,
            SessionPhase::Finished { processed, .. } => *processed,
        }
    }

    /// Entries waiting for practice
    pub fn batch(&self) -> &[PendingEntry] {
        match self {
            SessionPhase::Learning { batch, .. }
            | SessionPhase::Break { batch, .. }
            | SessionPhase::Practice { batch, .. } => batch,
            SessionPhase::Finished { .. } => &[],
        }
    }

    /// Next moment a `Tick` can change the phase
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        match self {
            SessionPhase::Break { deadline, .. } => Some(*deadline),
            SessionPhase::Practice { feedback_until, .. } => *feedback_until,
            _ => None,
        }
    }

    /// Batch entries whose rating has not been committed yet
    fn unresolved(&self) -> usize {
        match self {
            SessionPhase::Learning { batch, .. } | SessionPhase::Break { batch, .. } => {
                batch.len()
            }
            SessionPhase::Practice {
                batch,
                practice_index,
                feedback_until,
                ..
            } => {
                let resolved = practice_index + usize::from(feedback_until.is_some());
                batch.len().saturating_sub(resolved)
            }
            SessionPhase::Finished { .. } => 0,
        }
    }
}

// ============================================================================
// EVENTS AND EFFECTS
// ============================================================================

/// Input to the phase machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Card turned over (learning only)
    Flip,
    /// Recall rating for the current word (learning only)
    Rate(Rating),
    /// End the break early
    SkipBreak,
    /// Graded practice answer for the current entry
    Answer { correct: bool },
    /// Time passed; expires breaks and feedback holds
    Tick,
    /// User left the session
    Leave,
}

/// Side effect requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Persist `apply_rating(existing, rating, now)` for the word
    Commit { item: VocabularyItem, rating: Rating },
    Cue(Cue),
    /// Build and present the exercise for this entry
    PrepareExercise { entry: PendingEntry },
    /// A practice round finished
    RecordRound { correct: usize, total: usize },
    /// Pending entries dropped without a commit
    Discard { entries: usize },
}

/// What a transition needs to know about the session
#[derive(Debug, Clone, Copy)]
pub struct ReduceContext<'a> {
    pub queue: &'a [VocabularyItem],
    pub now: DateTime<Utc>,
    pub config: &'a SchedulerConfig,
}

/// Result of [`reduce`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub phase: SessionPhase,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(phase: SessionPhase) -> Self {
        Self {
            phase,
            effects: Vec::new(),
        }
    }

    fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Prepend effects that happen before this transition's own
    fn after(mut self, mut earlier: Vec<Effect>) -> Self {
        earlier.append(&mut self.effects);
        self.effects = earlier;
        self
    }
}

// ============================================================================
// REDUCER
// ============================================================================

/// Advance the phase machine by one event.
///
/// Events that make no sense in the current phase leave it unchanged.
pub fn reduce(phase: SessionPhase, event: SessionEvent, ctx: &ReduceContext<'_>) -> Transition {
    if event == SessionEvent::Leave {
        return leave(phase);
    }

    match phase {
        SessionPhase::Learning { index, batch } => learning(index, batch, event, ctx),
        SessionPhase::Break {
            index,
            batch,
            kind,
            deadline,
        } => match event {
            SessionEvent::SkipBreak => start_practice(index, batch, ctx),
            SessionEvent::Tick if ctx.now >= deadline => start_practice(index, batch, ctx),
            _ => Transition::to(SessionPhase::Break {
                index,
                batch,
                kind,
                deadline,
            }),
        },
        SessionPhase::Practice {
            index,
            batch,
            practice_index,
            score,
            feedback_until,
        } => practice(index, batch, practice_index, score, feedback_until, event, ctx),
        finished @ SessionPhase::Finished { .. } => Transition::to(finished),
    }
}

fn leave(phase: SessionPhase) -> Transition {
    if phase.is_finished() {
        return Transition::to(phase);
    }
    let discarded = phase.unresolved();
    let transition = Transition::to(SessionPhase::Finished {
        processed: phase.index(),
        abandoned: true,
    });
    if discarded > 0 {
        transition.with(Effect::Discard { entries: discarded })
    } else {
        transition
    }
}

fn learning(
    index: usize,
    mut batch: Vec<PendingEntry>,
    event: SessionEvent,
    ctx: &ReduceContext<'_>,
) -> Transition {
    let current = match ctx.queue.get(index) {
        Some(item) => item,
        None => return settle(index, batch, ctx),
    };

    match event {
        SessionEvent::Flip => {
            Transition::to(SessionPhase::Learning { index, batch }).with(Effect::Cue(Cue::Flip))
        }
        SessionEvent::Rate(Rating::Again) => settle(index + 1, batch, ctx).after(vec![
            Effect::Commit {
                item: current.clone(),
                rating: Rating::Again,
            },
        ]),
        SessionEvent::Rate(rating) => {
            batch.push(PendingEntry {
                item: current.clone(),
                rating,
            });
            settle(index + 1, batch, ctx)
        }
        _ => Transition::to(SessionPhase::Learning { index, batch }),
    }
}

/// Decide where learning goes after the index moved
fn settle(index: usize, batch: Vec<PendingEntry>, ctx: &ReduceContext<'_>) -> Transition {
    if batch.len() >= ctx.config.batch_size {
        return start_break(index, batch, BreakKind::Long, ctx);
    }
    if index >= ctx.queue.len() {
        if batch.is_empty() {
            return Transition::to(SessionPhase::Finished {
                processed: ctx.queue.len(),
                abandoned: false,
            })
            .with(Effect::Cue(Cue::Win));
        }
        return start_break(index, batch, BreakKind::Short, ctx);
    }
    Transition::to(SessionPhase::Learning { index, batch })
}

fn start_break(
    index: usize,
    batch: Vec<PendingEntry>,
    kind: BreakKind,
    ctx: &ReduceContext<'_>,
) -> Transition {
    let length = match kind {
        BreakKind::Long => ctx.config.long_break(),
        BreakKind::Short => ctx.config.short_break(),
    };
    Transition::to(SessionPhase::Break {
        index,
        batch,
        kind,
        deadline: ctx.now + length,
    })
    .with(Effect::Cue(Cue::Relax))
}

fn start_practice(index: usize, batch: Vec<PendingEntry>, ctx: &ReduceContext<'_>) -> Transition {
    let Some(first) = batch.first().cloned() else {
        return settle(index, batch, ctx);
    };
    Transition::to(SessionPhase::Practice {
        index,
        batch,
        practice_index: 0,
        score: 0,
        feedback_until: None,
    })
    .with(Effect::PrepareExercise { entry: first })
}

fn practice(
    index: usize,
    batch: Vec<PendingEntry>,
    practice_index: usize,
    score: usize,
    feedback_until: Option<DateTime<Utc>>,
    event: SessionEvent,
    ctx: &ReduceContext<'_>,
) -> Transition {
    match (event, feedback_until) {
        (SessionEvent::Answer { correct }, None) => {
            let Some(entry) = batch.get(practice_index) else {
                return finish_round(index, batch.len(), score, ctx);
            };
            let rating = if correct { entry.rating } else { Rating::Again };
            let commit = Effect::Commit {
                item: entry.item.clone(),
                rating,
            };
            let cue = Effect::Cue(if correct { Cue::Correct } else { Cue::Wrong });
            Transition::to(SessionPhase::Practice {
                index,
                batch,
                practice_index,
                score: score + usize::from(correct),
                feedback_until: Some(ctx.now + ctx.config.feedback_hold()),
            })
            .with(commit)
            .with(cue)
        }
        (SessionEvent::Tick, Some(until)) if ctx.now >= until => {
            let next = practice_index + 1;
            match batch.get(next).cloned() {
                Some(entry) => Transition::to(SessionPhase::Practice {
                    index,
                    batch,
                    practice_index: next,
                    score,
                    feedback_until: None,
                })
                .with(Effect::PrepareExercise { entry }),
                None => finish_round(index, batch.len(), score, ctx),
            }
        }
        _ => Transition::to(SessionPhase::Practice {
            index,
            batch,
            practice_index,
            score,
            feedback_until,
        }),
    }
}

/// Batch fully resolved: record the round and resume learning
fn finish_round(index: usize, total: usize, correct: usize, ctx: &ReduceContext<'_>) -> Transition {
    settle(index, Vec::new(), ctx).after(vec![Effect::RecordRound { correct, total }])
}
