//! Journey: what reaches durable storage, and what happens when it can't

use std::sync::Arc;

use chrono::Duration;
use vocabox_core::{
    JsonContentSource, ManualClock, ProgressStore, Rating, SchedulerConfig, SessionError,
    SessionRequest, SessionServices, StudySession,
};
use vocabox_e2e_tests::{
    fixed_now, FlakyStore, SessionFixture, TestDataFactory, TestProgressDb, USER,
};

#[test]
fn test_sqlite_session_survives_reopen() {
    let db = TestProgressDb::new_temp();
    let mut f = SessionFixture::start(
        TestDataFactory::animals(3),
        db.store.clone(),
        SchedulerConfig::default(),
    );

    f.session.rate(Rating::Good);
    f.session.rate(Rating::Easy);
    f.session.rate(Rating::Again);
    f.session.skip_break();
    f.answer(true);
    f.answer(true);
    assert!(f.session.is_finished());

    let on_disk = db.load_fresh(USER, TestDataFactory::TOPIC);
    assert_eq!(on_disk.word("a00").unwrap().box_level, 1);
    assert_eq!(on_disk.word("a01").unwrap().box_level, 2);
    assert_eq!(on_disk.word("a02").unwrap().box_level, 0);
    assert_eq!(on_disk.quiz_scores.len(), 1);
    assert_eq!(on_disk.quiz_scores[0].score, 100);
    assert!(on_disk.last_studied_at.is_some());
}

#[test]
fn test_next_session_picks_up_stored_schedule() {
    let db = TestProgressDb::new_temp();
    let mut first = SessionFixture::start(
        TestDataFactory::animals(3),
        db.store.clone(),
        SchedulerConfig::default(),
    );
    first.session.rate(Rating::Again);
    first.session.rate(Rating::Good);
    first.session.rate(Rating::Good);
    first.session.skip_break();
    first.answer(true);
    first.answer(true);

    // a00 is due again at once, a01/a02 wait ten minutes
    let second = SessionFixture::start(
        TestDataFactory::animals(3),
        Arc::new(db.reopen()),
        SchedulerConfig::default(),
    );
    let ids: Vec<&str> = second.session.queue().iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, vec!["a00"]);
}

#[test]
fn test_study_time_reaches_store() {
    let db = TestProgressDb::new_temp();
    let mut f = SessionFixture::start(
        TestDataFactory::animals(2),
        db.store.clone(),
        SchedulerConfig::default(),
    );
    for _ in 0..45 {
        f.session.record_elapsed_second();
    }
    assert_eq!(db.load_fresh(USER, TestDataFactory::TOPIC).study_seconds, 30);

    f.session.leave();
    assert_eq!(db.load_fresh(USER, TestDataFactory::TOPIC).study_seconds, 45);
}

#[test]
fn test_write_failures_keep_session_going() {
    let store = Arc::new(FlakyStore::new());
    let mut f = SessionFixture::start(
        TestDataFactory::animals(3),
        store.clone(),
        SchedulerConfig::default(),
    );

    f.session.rate(Rating::Again);
    store.fail_writes(true);
    f.session.rate(Rating::Again);
    f.session.rate(Rating::Good);
    f.session.skip_break();
    f.answer(true);
    assert!(f.session.is_finished());

    // local state was not rolled back
    assert_eq!(f.session.progress().word("a01").unwrap().box_level, 0);
    assert_eq!(f.session.progress().word("a02").unwrap().box_level, 1);

    store.fail_writes(false);
    let stored = store.load(USER, TestDataFactory::TOPIC).unwrap();
    assert!(stored.word("a00").is_some());
    assert!(stored.word("a01").is_none());
    assert!(stored.word("a02").is_none());
    assert!(stored.quiz_scores.is_empty());

    let summary = f.session.summary();
    assert_eq!(summary.failed_writes, store.rejected());
    assert_eq!(summary.failed_writes, 3);
}

#[test]
fn test_load_failure_starts_from_scratch() {
    let store = Arc::new(FlakyStore::new());
    store
        .commit_rating(
            USER,
            TestDataFactory::TOPIC,
            "a00",
            &TestDataFactory::progress_in_box(5, Duration::hours(1)),
        )
        .unwrap();
    store.fail_loads(true);

    let f = SessionFixture::start(
        TestDataFactory::animals(2),
        store,
        SchedulerConfig::default(),
    );
    // the scheduled word looks new because nothing could be read
    assert_eq!(f.session.queue().len(), 2);
    assert!(f.session.progress().word_state.is_empty());
}

#[test]
fn test_abandoned_batch_is_not_saved() {
    let db = TestProgressDb::new_temp();
    let mut f = SessionFixture::start(
        TestDataFactory::animals(5),
        db.store.clone(),
        SchedulerConfig::default(),
    );
    f.session.rate(Rating::Easy);
    f.session.rate(Rating::Good);
    f.session.rate(Rating::Again);

    let summary = f.session.leave();
    assert!(summary.abandoned);
    assert_eq!(summary.discarded, 2);
    assert!(f.session.is_finished());

    let on_disk = db.load_fresh(USER, TestDataFactory::TOPIC);
    assert_eq!(on_disk.word_state.len(), 1);
    assert!(on_disk.word("a02").is_some());

    // the dropped words come back as new next time
    let next = SessionFixture::start(
        TestDataFactory::animals(5),
        Arc::new(db.reopen()),
        SchedulerConfig::default(),
    );
    let ids: Vec<&str> = next.session.queue().iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, vec!["a02", "a00", "a01", "a03", "a04"]);
}

#[test]
fn test_leave_during_practice_keeps_confirmed_answers() {
    let db = TestProgressDb::new_temp();
    let mut f = SessionFixture::start(
        TestDataFactory::animals(3),
        db.store.clone(),
        SchedulerConfig::default(),
    );
    f.rate_many(Rating::Good, 3);
    f.session.skip_break();
    f.answer(true);

    let summary = f.session.leave();
    assert_eq!(summary.discarded, 2);

    let on_disk = db.load_fresh(USER, TestDataFactory::TOPIC);
    assert_eq!(on_disk.word("a00").unwrap().box_level, 1);
    assert!(on_disk.word("a01").is_none());
    assert!(on_disk.quiz_scores.is_empty());
}

#[test]
fn test_vocabulary_from_json_file() {
    let file = TestDataFactory::vocab_file(&TestDataFactory::animals(4));
    let db = TestProgressDb::new_temp();
    let services = SessionServices::new(db.store.clone())
        .with_clock(Arc::new(ManualClock::new(fixed_now())))
        .with_seed(5);

    let session = StudySession::start(
        SessionRequest::new(USER, TestDataFactory::TOPIC),
        &JsonContentSource::new(file.path()),
        services,
        SchedulerConfig::default(),
    )
    .unwrap();
    assert_eq!(session.queue().len(), 4);
    assert_eq!(session.current_word().unwrap().word, "cat");
}

#[test]
fn test_missing_vocabulary_is_reported() {
    let db = TestProgressDb::new_temp();
    let err = StudySession::start(
        SessionRequest::new(USER, TestDataFactory::TOPIC),
        &JsonContentSource::new(db.path().with_file_name("missing.json")),
        SessionServices::new(db.store.clone()),
        SchedulerConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, SessionError::ContentLoad { .. }));
    assert!(err.to_string().contains(TestDataFactory::TOPIC));
}
