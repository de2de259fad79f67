//! Session fixture
//!
//! Starts a [`StudySession`] against a manual clock, a seeded RNG and
//! recording capabilities, with helpers for the moves a learner makes.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use vocabox_core::{
    Answer, Clock, Exercise, ManualClock, MemoryStore, ProgressStore, Rating, SchedulerConfig,
    SessionRequest, SessionServices, StaticContent, StudySession, VocabularyItem,
};

use crate::mocks::{fixed_now, RecordingCues, RecordingSpeech, TestDataFactory};

pub const USER: &str = "alice";

/// A running session plus handles on everything it was given
pub struct SessionFixture {
    pub session: StudySession,
    pub store: Arc<dyn ProgressStore>,
    pub clock: Arc<ManualClock>,
    pub speech: Arc<RecordingSpeech>,
    pub cues: Arc<RecordingCues>,
}

impl SessionFixture {
    /// `n` fresh animal words against an in-memory store
    pub fn with_words(n: usize) -> Self {
        Self::start(
            TestDataFactory::animals(n),
            Arc::new(MemoryStore::new()),
            SchedulerConfig::default(),
        )
    }

    pub fn start(
        words: Vec<VocabularyItem>,
        store: Arc<dyn ProgressStore>,
        config: SchedulerConfig,
    ) -> Self {
        Self::start_with(
            words,
            store,
            config,
            RecordingSpeech::default(),
            RecordingCues::default(),
            42,
        )
    }

    /// Full control over the capabilities and the RNG seed
    pub fn start_with(
        words: Vec<VocabularyItem>,
        store: Arc<dyn ProgressStore>,
        config: SchedulerConfig,
        speech: RecordingSpeech,
        cues: RecordingCues,
        seed: u64,
    ) -> Self {
        let topic = words
            .first()
            .map(|w| w.topic_id.clone())
            .unwrap_or_else(|| TestDataFactory::TOPIC.to_string());
        let clock = Arc::new(ManualClock::new(fixed_now()));
        let speech = Arc::new(speech);
        let cues = Arc::new(cues);

        let services = SessionServices::new(store.clone())
            .with_clock(clock.clone())
            .with_speech(speech.clone())
            .with_cues(cues.clone())
            .with_seed(seed);

        let session = StudySession::start(
            SessionRequest::new(USER, topic),
            &StaticContent::new(words),
            services,
            config,
        )
        .expect("Failed to start session");

        Self {
            session,
            store,
            clock,
            speech,
            cues,
        }
    }

    /// Rate the next `n` words the same way
    pub fn rate_many(&mut self, rating: Rating, n: usize) {
        for _ in 0..n {
            self.session.rate(rating);
        }
    }

    /// The right answer to whatever exercise is showing
    pub fn right_answer(&self) -> Answer {
        match self.session.current_exercise().expect("No exercise showing") {
            Exercise::MultipleChoice { answer_index, .. } => Answer::Choice(*answer_index),
            Exercise::Listening { word, .. } => Answer::Typed(word.clone()),
        }
    }

    /// An answer no exercise accepts
    pub fn wrong_answer(&self) -> Answer {
        match self.session.current_exercise().expect("No exercise showing") {
            Exercise::MultipleChoice {
                options,
                answer_index,
                ..
            } if options.len() > 1 => Answer::Choice((answer_index + 1) % options.len()),
            _ => Answer::Typed("zzz-not-a-word".to_string()),
        }
    }

    /// Answer the showing exercise, then wait out the feedback hold
    pub fn answer(&mut self, correct: bool) -> String {
        let word_id = self
            .session
            .current_exercise()
            .expect("No exercise showing")
            .word_id()
            .to_string();
        let answer = if correct {
            self.right_answer()
        } else {
            self.wrong_answer()
        };
        assert_eq!(self.session.submit_answer(&answer), Some(correct));
        self.advance(self.session.config().feedback_hold());
        self.session.poll();
        word_id
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    pub fn clock_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Progress as a store reader sees it
    pub fn stored(&self) -> vocabox_core::TopicProgress {
        self.store
            .load(USER, &self.session.request().topic_id)
            .expect("Failed to load progress")
    }
}
