//! Study session controller
//!
//! Owns the queue, the phase machine and the in-memory progress snapshot,
//! and carries out the effects [`reduce`] asks for:
//! - commits go to the progress store in the order they were produced
//! - a failed commit is logged and the session carries on
//! - speech and cue failures are dropped silently

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::phase::{reduce, Effect, ReduceContext, SessionEvent, SessionPhase, Transition};
use crate::capabilities::{AudioCues, Cue, Silent, Speech};
use crate::clock::{Clock, SystemClock};
use crate::config::SchedulerConfig;
use crate::content::{ContentError, ContentSource};
use crate::model::{QuizScore, TopicProgress, VocabularyItem, WordProgress};
use crate::practice::{build_exercise, Answer, Exercise};
use crate::queue::build_queue;
use crate::schedule::{apply_rating, Rating};
use crate::storage::ProgressStore;

// ============================================================================
// ERRORS
// ============================================================================

/// Failure to start a session
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The topic's vocabulary could not be retrieved
    #[error("Could not load vocabulary for topic {topic_id}: {source}")]
    ContentLoad {
        topic_id: String,
        #[source]
        source: ContentError,
    },
}

// ============================================================================
// COLLABORATORS
// ============================================================================

/// Who is studying what
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub user_id: String,
    pub topic_id: String,
}

impl SessionRequest {
    pub fn new(user_id: impl Into<String>, topic_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            topic_id: topic_id.into(),
        }
    }
}

/// External capabilities a session runs against
pub struct SessionServices {
    pub store: Arc<dyn ProgressStore>,
    pub clock: Arc<dyn Clock>,
    pub speech: Arc<dyn Speech>,
    pub cues: Arc<dyn AudioCues>,
    pub rng: Box<dyn RngCore + Send>,
}

impl SessionServices {
    /// Wall clock, no sound, entropy-seeded RNG
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            speech: Arc::new(Silent),
            cues: Arc::new(Silent),
            rng: Box::new(ChaCha8Rng::from_entropy()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_speech(mut self, speech: Arc<dyn Speech>) -> Self {
        self.speech = speech;
        self
    }

    pub fn with_cues(mut self, cues: Arc<dyn AudioCues>) -> Self {
        self.cues = cues;
        self
    }

    /// Deterministic exercise generation
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Box::new(ChaCha8Rng::seed_from_u64(seed));
        self
    }
}

// ============================================================================
// SUMMARY
// ============================================================================

/// What a session did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub queue_len: usize,
    /// Queue words rated
    pub processed: usize,
    /// Rating writes issued (including failed ones)
    pub commits: usize,
    pub failed_writes: usize,
    pub practice_rounds: usize,
    pub practice_answers: usize,
    pub practice_correct: usize,
    /// Pending entries dropped by leaving early
    pub discarded: usize,
    pub study_seconds: u64,
    pub abandoned: bool,
}

// ============================================================================
// STUDY SESSION
// ============================================================================

/// One user's pass through one topic
pub struct StudySession {
    id: Uuid,
    request: SessionRequest,
    config: SchedulerConfig,
    services: SessionServices,
    topic_words: Vec<VocabularyItem>,
    queue: Vec<VocabularyItem>,
    progress: TopicProgress,
    phase: SessionPhase,
    exercise: Option<Exercise>,
    last_answer: Option<bool>,
    pending_seconds: u64,
    summary: SessionSummary,
}

impl StudySession {
    /// Load the topic, snapshot progress and build the queue.
    ///
    /// Only a content failure stops a session from starting. A failing
    /// progress load is logged and the session starts from a blank snapshot.
    pub fn start(
        request: SessionRequest,
        content: &dyn ContentSource,
        services: SessionServices,
        config: SchedulerConfig,
    ) -> Result<Self, SessionError> {
        let config = config.normalized();
        let topic_words = content
            .list_vocabulary(&request.topic_id)
            .map_err(|source| SessionError::ContentLoad {
                topic_id: request.topic_id.clone(),
                source,
            })?;

        let progress = match services.store.load(&request.user_id, &request.topic_id) {
            Ok(progress) => progress,
            Err(e) => {
                warn!(
                    "Failed to load progress for {}/{}: {}; starting from empty snapshot",
                    request.user_id, request.topic_id, e
                );
                TopicProgress::default()
            }
        };

        let now = services.clock.now();
        let queue = build_queue(&topic_words, &progress, now);
        let phase = SessionPhase::initial(queue.len());
        let id = Uuid::new_v4();

        info!(
            session = %id,
            user = %request.user_id,
            topic = %request.topic_id,
            "Session started: {} words in topic, {} queued",
            topic_words.len(),
            queue.len()
        );

        let summary = SessionSummary {
            session_id: id,
            queue_len: queue.len(),
            ..Default::default()
        };

        Ok(Self {
            id,
            request,
            config,
            services,
            topic_words,
            queue,
            progress,
            phase,
            exercise: None,
            last_answer: None,
            pending_seconds: 0,
            summary,
        })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn request(&self) -> &SessionRequest {
        &self.request
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn queue(&self) -> &[VocabularyItem] {
        &self.queue
    }

    /// Progress as this session sees it, including its own commits
    pub fn progress(&self) -> &TopicProgress {
        &self.progress
    }

    /// Word on the card while learning
    pub fn current_word(&self) -> Option<&VocabularyItem> {
        match &self.phase {
            SessionPhase::Learning { index, .. } => self.queue.get(*index),
            _ => None,
        }
    }

    /// Exercise awaiting an answer while practicing
    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.exercise.as_ref()
    }

    /// Outcome of the most recent practice answer, while feedback shows
    pub fn last_answer(&self) -> Option<bool> {
        match self.phase {
            SessionPhase::Practice {
                feedback_until: Some(_),
                ..
            } => self.last_answer,
            _ => None,
        }
    }

    /// Time left on the running break
    pub fn break_remaining(&self) -> Option<Duration> {
        match &self.phase {
            SessionPhase::Break { deadline, .. } => {
                Some((*deadline - self.services.clock.now()).max(Duration::zero()))
            }
            _ => None,
        }
    }

    /// When `poll` next needs to run
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.phase.deadline()
    }

    /// How long until `next_deadline`, never negative
    pub fn time_until_deadline(&self) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| (deadline - self.services.clock.now()).max(Duration::zero()))
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_finished()
    }

    pub fn summary(&self) -> SessionSummary {
        let mut summary = self.summary.clone();
        summary.processed = self.phase.index();
        summary
    }

    // ========================================================================
    // USER ACTIONS
    // ========================================================================

    pub fn flip(&mut self) {
        self.dispatch(SessionEvent::Flip);
    }

    pub fn rate(&mut self, rating: Rating) {
        self.dispatch(SessionEvent::Rate(rating));
    }

    pub fn skip_break(&mut self) {
        self.dispatch(SessionEvent::SkipBreak);
    }

    /// Grade and submit a practice answer.
    ///
    /// Returns whether it was correct, or `None` when no exercise is waiting.
    pub fn submit_answer(&mut self, answer: &Answer) -> Option<bool> {
        let correct = self.exercise.take()?.grade(answer);
        self.last_answer = Some(correct);
        self.dispatch(SessionEvent::Answer { correct });
        Some(correct)
    }

    /// Speak the current card, or replay the listening prompt
    pub fn pronounce(&self) {
        let text = match (&self.phase, &self.exercise) {
            (SessionPhase::Learning { index, .. }, _) => {
                self.queue.get(*index).map(|w| w.word.as_str())
            }
            (_, Some(Exercise::Listening { word, .. })) => Some(word.as_str()),
            _ => None,
        };
        if let Some(text) = text {
            self.speak(text);
        }
    }

    /// Force a word back to box 0, due now
    pub fn reset_word(&mut self, word_id: &str) {
        let now = self.services.clock.now();
        self.progress
            .word_state
            .insert(word_id.to_string(), WordProgress::reset(now));
        if let Err(e) =
            self.services
                .store
                .reset_word(&self.request.user_id, &self.request.topic_id, word_id, now)
        {
            self.summary.failed_writes += 1;
            warn!(session = %self.id, "Failed to reset word {}: {}", word_id, e);
        }
    }

    /// Abandon the session. Unconfirmed batch entries are dropped.
    pub fn leave(&mut self) -> SessionSummary {
        self.dispatch(SessionEvent::Leave);
        self.summary()
    }

    // ========================================================================
    // TIMERS
    // ========================================================================

    /// One second of study time elapsed (driven by the ticker)
    pub fn record_elapsed_second(&mut self) {
        if !self.phase.counts_study_time() {
            return;
        }
        self.pending_seconds += 1;
        if self.pending_seconds >= self.config.time_flush_secs {
            self.flush_study_time(self.services.clock.now());
        }
    }

    /// Expire a break or feedback hold whose deadline has passed
    pub fn poll(&mut self) {
        if self.phase.deadline().is_some() {
            self.dispatch(SessionEvent::Tick);
        }
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn dispatch(&mut self, event: SessionEvent) {
        let now = self.services.clock.now();
        let previous = std::mem::replace(
            &mut self.phase,
            SessionPhase::Finished {
                processed: 0,
                abandoned: false,
            },
        );
        let was = previous.name();
        let was_index = previous.index();
        let was_finished = previous.is_finished();
        let label = event.clone();

        let ctx = ReduceContext {
            queue: &self.queue,
            now,
            config: &self.config,
        };
        let Transition { phase, effects } = reduce(previous, event, &ctx);

        if phase.name() != was {
            info!(session = %self.id, "Phase {} -> {}", was, phase.name());
        } else if effects.is_empty()
            && phase.index() == was_index
            && label != SessionEvent::Tick
        {
            debug!(session = %self.id, "Ignored {:?} while {}", label, was);
        }
        if let SessionPhase::Finished { abandoned, .. } = &phase {
            self.summary.abandoned = *abandoned;
        }
        let now_finished = phase.is_finished();
        self.phase = phase;

        for effect in effects {
            self.apply_effect(effect, now);
        }

        if now_finished && !was_finished {
            self.exercise = None;
            self.flush_study_time(now);
            let summary = self.summary();
            info!(
                session = %self.id,
                processed = summary.processed,
                commits = summary.commits,
                discarded = summary.discarded,
                "Session finished{}",
                if summary.abandoned { " (abandoned)" } else { "" }
            );
        }
    }

    fn apply_effect(&mut self, effect: Effect, now: DateTime<Utc>) {
        match effect {
            Effect::Commit { item, rating } => self.commit(&item, rating, now),
            Effect::Cue(cue) => self.cue(cue),
            Effect::PrepareExercise { entry } => {
                let exercise = build_exercise(
                    &entry.item,
                    &self.topic_words,
                    self.config.distractor_count,
                    &mut self.services.rng,
                );
                if let Exercise::Listening { word, .. } = &exercise {
                    self.speak(word);
                }
                debug!(
                    session = %self.id,
                    "Prepared {:?} exercise for {}",
                    exercise.kind(),
                    entry.item.id
                );
                self.exercise = Some(exercise);
            }
            Effect::RecordRound { correct, total } => self.record_round(correct, total, now),
            Effect::Discard { entries } => {
                self.summary.discarded += entries;
                warn!(
                    session = %self.id,
                    "Discarding {} unconfirmed batch entries; their ratings are not saved",
                    entries
                );
            }
        }
    }

    fn commit(&mut self, item: &VocabularyItem, rating: Rating, now: DateTime<Utc>) {
        let updated = apply_rating(self.progress.word(&item.id), rating, now);
        self.progress.word_state.insert(item.id.clone(), updated);
        self.progress.last_studied_at = Some(now);
        self.summary.commits += 1;
        // only answers commit while practicing
        if matches!(self.phase, SessionPhase::Practice { .. }) {
            self.summary.practice_answers += 1;
        }

        debug!(
            session = %self.id,
            "Commit {} {} -> box {}",
            item.id,
            rating,
            updated.box_level
        );

        if let Err(e) = self.services.store.commit_rating(
            &self.request.user_id,
            &self.request.topic_id,
            &item.id,
            &updated,
        ) {
            self.summary.failed_writes += 1;
            warn!(session = %self.id, "Failed to save rating for {}: {}", item.id, e);
        }
    }

    fn record_round(&mut self, correct: usize, total: usize, now: DateTime<Utc>) {
        self.summary.practice_rounds += 1;
        self.summary.practice_correct += correct;
        let percent = if total == 0 {
            0
        } else {
            ((correct as f64 / total as f64) * 100.0).round() as u32
        };
        let score = QuizScore {
            score: percent,
            recorded_at: now,
        };
        self.progress.quiz_scores.push(score);

        info!(session = %self.id, "Practice round: {}/{} correct", correct, total);

        if let Err(e) =
            self.services
                .store
                .commit_quiz_score(&self.request.user_id, &self.request.topic_id, score)
        {
            self.summary.failed_writes += 1;
            warn!(session = %self.id, "Failed to save quiz score: {}", e);
        }
    }

    fn flush_study_time(&mut self, now: DateTime<Utc>) {
        if self.pending_seconds == 0 {
            return;
        }
        let seconds = std::mem::take(&mut self.pending_seconds);
        self.progress.study_seconds += seconds;
        self.progress.last_studied_at = Some(now);
        self.summary.study_seconds += seconds;

        if let Err(e) = self.services.store.commit_time_increment(
            &self.request.user_id,
            &self.request.topic_id,
            seconds,
            now,
        ) {
            self.summary.failed_writes += 1;
            warn!(session = %self.id, "Failed to save {}s of study time: {}", seconds, e);
        }
    }

    fn speak(&self, text: &str) {
        if let Err(e) = self.services.speech.speak(text, &self.config.speech_lang) {
            debug!("Speech unavailable: {}", e);
        }
    }

    fn cue(&self, cue: Cue) {
        if let Err(e) = self.services.cues.play_cue(cue) {
            debug!("Audio cue {} unavailable: {}", cue, e);
        }
    }
}

impl std::fmt::Debug for StudySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudySession")
            .field("id", &self.id)
            .field("request", &self.request)
            .field("phase", &self.phase.name())
            .field("index", &self.phase.index())
            .field("queue_len", &self.queue.len())
            .finish()
    }
}
