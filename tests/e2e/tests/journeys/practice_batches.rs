//! Journey: positive ratings wait in a batch until practice confirms them

use std::sync::Arc;

use chrono::Duration;
use vocabox_core::{
    apply_rating, BreakKind, Cue, Exercise, MemoryStore, ProgressStore, Rating, SchedulerConfig,
    SessionPhase,
};
use vocabox_e2e_tests::{fixed_now, SessionFixture, TestDataFactory, USER};

#[test]
fn test_ten_positive_ratings_start_long_break() {
    let mut f = SessionFixture::with_words(12);
    f.rate_many(Rating::Good, 9);
    assert_eq!(f.session.phase().name(), "learning");

    f.session.rate(Rating::Easy);
    match f.session.phase() {
        SessionPhase::Break {
            index,
            batch,
            kind,
            deadline,
        } => {
            assert_eq!(*index, 10);
            assert_eq!(batch.len(), 10);
            assert_eq!(*kind, BreakKind::Long);
            assert_eq!(*deadline, fixed_now() + Duration::seconds(300));
        }
        other => panic!("expected long break, got {:?}", other),
    }
    assert!(f.stored().word_state.is_empty());

    f.advance(Duration::seconds(120));
    f.session.poll();
    assert_eq!(f.session.break_remaining(), Some(Duration::seconds(180)));

    f.advance(Duration::seconds(180));
    f.session.poll();
    assert_eq!(f.session.phase().name(), "practice");
}

#[test]
fn test_again_ratings_do_not_fill_batch() {
    let mut f = SessionFixture::with_words(14);
    for i in 0..13 {
        f.session.rate(if i % 3 == 0 { Rating::Again } else { Rating::Good });
    }
    // 5 agains, 8 goods: still learning the last word
    assert_eq!(f.session.phase().name(), "learning");
    assert_eq!(f.session.phase().batch().len(), 8);
    assert_eq!(f.stored().word_state.len(), 5);
}

#[test]
fn test_full_round_then_trailing_batch() {
    let mut f = SessionFixture::with_words(12);
    f.rate_many(Rating::Good, 10);
    f.session.skip_break();

    let mut confirmed = Vec::new();
    let mut missed = Vec::new();
    for i in 0..10 {
        let correct = i < 7;
        let id = f.answer(correct);
        if correct {
            confirmed.push(id);
        } else {
            missed.push(id);
        }
    }

    // round recorded, back to the word after the batch
    assert_eq!(f.session.phase().name(), "learning");
    assert_eq!(f.session.current_word().unwrap().id, "a10");
    let stored = f.stored();
    assert_eq!(stored.quiz_scores.len(), 1);
    assert_eq!(stored.quiz_scores[0].score, 70);
    for id in &confirmed {
        assert_eq!(stored.word(id).unwrap().box_level, 1, "{} should be confirmed", id);
    }
    for id in &missed {
        assert_eq!(stored.word(id).unwrap().box_level, 0, "{} should be demoted", id);
    }

    f.rate_many(Rating::Easy, 2);
    assert!(matches!(
        f.session.phase(),
        SessionPhase::Break {
            kind: BreakKind::Short,
            ..
        }
    ));
    f.session.skip_break();
    f.answer(true);
    f.answer(false);
    assert!(f.session.is_finished());

    let stored = f.stored();
    assert_eq!(stored.word("a10").unwrap().box_level, 2);
    assert_eq!(stored.word("a11").unwrap().box_level, 0);
    assert_eq!(stored.quiz_scores.len(), 2);
    assert_eq!(stored.quiz_scores[1].score, 50);

    let summary = f.session.summary();
    assert_eq!(summary.practice_rounds, 2);
    assert_eq!(summary.practice_answers, 12);
    assert_eq!(summary.practice_correct, 8);
}

#[test]
fn test_practice_commit_builds_on_existing_state() {
    let store: Arc<dyn ProgressStore> = Arc::new(MemoryStore::new());
    let before = TestDataFactory::progress_in_box(2, Duration::days(3));
    for id in ["a00", "a01"] {
        store
            .commit_rating(USER, TestDataFactory::TOPIC, id, &before)
            .unwrap();
    }

    let mut f = SessionFixture::start(
        TestDataFactory::animals(2),
        store,
        SchedulerConfig::default(),
    );
    f.rate_many(Rating::Good, 2);
    f.session.skip_break();

    let answered_at = f.clock_now();
    f.answer(true);
    f.answer(false);

    let stored = f.stored();
    let confirmed = stored.word("a00").unwrap();
    assert_eq!(*confirmed, apply_rating(Some(&before), Rating::Good, answered_at));
    assert_eq!(confirmed.box_level, 3);
    assert_eq!(confirmed.streak, 3);

    let missed = stored.word("a01").unwrap();
    assert_eq!(missed.box_level, 0);
    assert_eq!(missed.streak, 0);
}

#[test]
fn test_exercises_cover_each_entry_in_order() {
    let mut f = SessionFixture::with_words(6);
    f.rate_many(Rating::Good, 6);
    f.session.skip_break();

    for expected in ["a00", "a01", "a02", "a03", "a04", "a05"] {
        let exercise = f.session.current_exercise().cloned().unwrap();
        assert_eq!(exercise.word_id(), expected);
        match &exercise {
            Exercise::MultipleChoice {
                prompt,
                options,
                answer_index,
                ..
            } => {
                let word = f.session.queue().iter().find(|w| w.id == expected).unwrap();
                assert_eq!(prompt, &word.word);
                assert_eq!(options.len(), 4);
                assert_eq!(options[*answer_index], word.meaning);
                let mut unique = options.clone();
                unique.sort();
                unique.dedup();
                assert_eq!(unique.len(), 4);
            }
            Exercise::Listening { word, .. } => {
                assert_eq!(f.speech.spoken().last(), Some(word));
            }
        }
        f.answer(true);
    }
    assert!(f.session.is_finished());
}

#[test]
fn test_feedback_hold_blocks_next_exercise() {
    let mut f = SessionFixture::with_words(2);
    f.rate_many(Rating::Good, 2);
    f.session.skip_break();

    let answer = f.right_answer();
    assert_eq!(f.session.submit_answer(&answer), Some(true));
    assert_eq!(f.session.last_answer(), Some(true));
    assert_eq!(f.session.submit_answer(&answer), None);

    f.advance(Duration::milliseconds(1000));
    f.session.poll();
    assert!(f.session.current_exercise().is_none());

    f.advance(Duration::milliseconds(500));
    f.session.poll();
    assert_eq!(f.session.current_exercise().unwrap().word_id(), "a01");
    assert_eq!(f.session.last_answer(), None);
    assert_eq!(f.cues.count(Cue::Correct), 1);
}

#[test]
fn test_single_word_topic_still_practices() {
    let mut f = SessionFixture::with_words(1);
    f.session.rate(Rating::Easy);
    f.session.skip_break();
    if let Some(Exercise::MultipleChoice { options, .. }) = f.session.current_exercise() {
        assert_eq!(options.len(), 1);
    }
    f.answer(true);
    assert!(f.session.is_finished());
    assert_eq!(f.stored().word("a00").unwrap().box_level, 2);
}
