//! # Failure Isolation Journeys
//!
//! A write that fails must leave that chunk exactly as it was and still due,
//! without disturbing the rest of the session.

use chrono::{Duration, Utc};
use refrain_core::{
    Error, ProgressStore, Rating, ReviewScheduler, SessionOrchestrator, StorageError,
};
use refrain_e2e_tests::{FailingStore, TestDatabaseManager};
use std::sync::Arc;

const USER: &str = "bass";

fn flaky_setup() -> (TestDatabaseManager, Arc<FailingStore>, SessionOrchestrator<FailingStore>) {
    let db = TestDatabaseManager::new_temp();
    db.seed_hymn();
    let store = Arc::new(FailingStore::new(Arc::clone(&db.storage)));
    let orchestrator = SessionOrchestrator::new(Arc::clone(&store), ReviewScheduler::default());
    (db, store, orchestrator)
}

#[test]
fn test_failed_write_keeps_chunk_current_until_retry() {
    let (db, store, orchestrator) = flaky_setup();
    let now = Utc::now();
    db.assign_song(USER, "amazing-grace", now);
    store.fail_saves_for("grace-verse-2");

    let mut session = orchestrator.start_session(USER, now).unwrap();
    session.submit(Rating::NailedIt, now).unwrap();

    let err = session.submit(Rating::Almost, now).unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(session.current().unwrap().chunk.id, "grace-verse-2");
    assert_eq!(session.summary().failed.len(), 1);

    // Untouched while the store is failing
    let stored = db.storage.get_progress(USER, "grace-verse-2").unwrap().unwrap();
    assert_eq!(stored.review_count, 0);
    assert_eq!(stored.version, 0);

    store.heal();
    let retried = session.submit(Rating::Almost, now).unwrap();
    assert_eq!(retried.progress.review_count, 1);
    assert!(session.summary().failed.is_empty());

    session.submit(Rating::NailedIt, now).unwrap();
    let summary = session.finish(now);
    assert_eq!(summary.chunks_reviewed, 3);
    assert!(!summary.has_failures());
    assert_eq!(store.rejected(), 1);
}

#[test]
fn test_batch_continues_past_failures() {
    let (db, store, orchestrator) = flaky_setup();
    let now = Utc::now();
    db.assign_song(USER, "amazing-grace", now);
    store.fail_saves_for("grace-verse-1");

    let summary = orchestrator.record_batch(
        USER,
        [
            ("grace-verse-1", Rating::NailedIt),
            ("grace-verse-2", Rating::NailedIt),
            ("grace-verse-3", Rating::Almost),
        ],
        now,
    );

    assert_eq!(summary.chunks_reviewed, 2);
    assert_eq!(summary.total_xp, 15);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].chunk_id, "grace-verse-1");
    assert_eq!(summary.failed[0].rating, Rating::NailedIt);
    assert!(summary.failed[0].retryable);

    let due = orchestrator.due_queue(USER, now + Duration::minutes(1)).unwrap();
    let ids: Vec<_> = due.iter().map(|d| d.chunk.id.as_str()).collect();
    assert_eq!(ids, vec!["grace-verse-1"]);

    let log = db.storage.review_history(USER, Some("grace-verse-1"), 10).unwrap();
    assert!(log.is_empty());
}

#[test]
fn test_offline_store_writes_nothing() {
    let (db, store, orchestrator) = flaky_setup();
    let now = Utc::now();
    db.assign_song(USER, "amazing-grace", now);
    store.set_offline(true);

    let summary = orchestrator.record_batch(
        USER,
        [
            ("grace-verse-1", Rating::NailedIt),
            ("grace-verse-2", Rating::Struggling),
        ],
        now,
    );
    assert_eq!(summary.chunks_reviewed, 0);
    assert_eq!(summary.total_xp, 0);
    assert_eq!(summary.failed.len(), 2);
    assert!(summary.failed.iter().all(|f| f.kind == "persistence"));

    assert!(db.storage.review_history(USER, None, 10).unwrap().is_empty());
    assert_eq!(orchestrator.due_queue(USER, now).unwrap().len(), 3);
}

#[test]
fn test_unknown_chunk_is_not_retryable() {
    let (db, _store, orchestrator) = flaky_setup();
    let now = Utc::now();
    db.assign_song(USER, "amazing-grace", now);

    let err = orchestrator
        .submit_review(USER, "no-such-chunk", Rating::NailedIt, now)
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert!(!err.is_retryable());
}

#[test]
fn test_stale_write_is_a_conflict() {
    let db = TestDatabaseManager::new_temp();
    db.seed_hymn();
    let now = Utc::now();
    db.assign_song(USER, "amazing-grace", now);

    let scheduler = ReviewScheduler::default();
    let read = db.storage.get_progress(USER, "grace-verse-3").unwrap().unwrap();
    let result = scheduler.advance(&read, Rating::NailedIt, now);

    db.storage.save_review(&result, 10).unwrap();
    let second = db.storage.save_review(&result, 10).unwrap_err();
    assert!(matches!(second, StorageError::Conflict(_)));

    // Exactly one review landed
    let stored = db.storage.get_progress(USER, "grace-verse-3").unwrap().unwrap();
    assert_eq!(stored.review_count, 1);
    assert_eq!(stored.version, 1);
    assert_eq!(db.storage.review_history(USER, Some("grace-verse-3"), 10).unwrap().len(), 1);

    // Resubmitting through the orchestrator reads the fresh row instead
    let outcome = db
        .orchestrator()
        .submit_review(USER, "grace-verse-3", Rating::NailedIt, now)
        .unwrap();
    assert!(outcome.extra_practice);
    assert_eq!(outcome.progress.version, 2);
}
