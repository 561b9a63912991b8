//! # Persistence Journeys
//!
//! Progress survives a restart, tuning files change the session rules, and
//! removing lyrics takes their progress and history with them.

use chrono::{Duration, SubsecRound, Utc};
use refrain_core::{
    MemoryStatus, PracticeConfig, ProgressStore, Rating, SessionOrchestrator,
};
use refrain_e2e_tests::{TestDataFactory, TestDatabaseManager};
use std::sync::Arc;

const USER: &str = "alto";

#[test]
fn test_progress_survives_reopen() {
    let db = TestDatabaseManager::new_temp();
    let chunks = db.seed_hymn();
    let now = Utc::now();
    db.assign_song(USER, "amazing-grace", now);

    let saved = db
        .orchestrator()
        .submit_review(USER, &chunks[0].id, Rating::NailedIt, now)
        .unwrap();

    let reopened = db.reopen();
    let loaded = reopened.get_progress(USER, &chunks[0].id).unwrap().unwrap();
    assert_eq!(loaded, saved.progress);
    assert_eq!(loaded.status(), MemoryStatus::Shaky);

    let chunk = reopened.get_chunk(&chunks[0].id).unwrap().unwrap();
    assert_eq!(chunk, chunks[0]);
    assert_eq!(reopened.list_song_chunks("amazing-grace").unwrap().len(), 3);
}

#[test]
fn test_tuning_changes_xp_and_intervals() {
    let db = TestDatabaseManager::new_temp();
    let chunks = db.seed_hymn();
    let now = Utc::now();
    db.assign_song(USER, "amazing-grace", now);

    let practice = PracticeConfig::from_json_str(
        r#"{
            "scheduler": { "bootstrapIntervals": [2, 5] },
            "xp": { "nailedIt": 25, "almost": 12, "struggling": 4 }
        }"#,
    )
    .unwrap();
    let orchestrator = SessionOrchestrator::new(Arc::clone(&db.storage), practice.review_scheduler())
        .with_fade_engine(practice.fade.clone())
        .with_xp_table(practice.xp.clone());

    let outcome = orchestrator
        .submit_review(USER, &chunks[0].id, Rating::NailedIt, now)
        .unwrap();
    assert_eq!(outcome.xp_earned, 25);
    assert_eq!(outcome.progress.interval_days, 2);
    assert_eq!(outcome.progress.next_review_at, (now + Duration::days(2)).trunc_subsecs(6));

    let stats = db.storage.user_stats(USER, now).unwrap();
    assert_eq!(stats.total_xp, 25);
}

#[test]
fn test_rejected_tuning_is_a_validation_error() {
    let err = PracticeConfig::from_json_str(r#"{ "scheduler": { "bootstrapIntervals": [0, 3] } }"#)
        .unwrap_err();
    assert_eq!(err.kind(), "validation");
}

#[test]
fn test_removing_a_chunk_removes_its_progress() {
    let db = TestDatabaseManager::new_temp();
    let chunks = db.seed_hymn();
    let now = Utc::now();
    db.assign_song(USER, "amazing-grace", now);
    db.orchestrator()
        .submit_review(USER, &chunks[1].id, Rating::Almost, now)
        .unwrap();

    assert!(db.storage.remove_chunk(&chunks[1].id).unwrap());
    assert_eq!(db.progress_count(USER), 2);
    assert!(db.storage.review_history(USER, Some(&chunks[1].id), 10).unwrap().is_empty());
    assert!(!db.storage.remove_chunk(&chunks[1].id).unwrap());
}

#[test]
fn test_reregistering_a_chunk_keeps_progress() {
    let db = TestDatabaseManager::new_temp();
    let chunks = db.seed_hymn();
    let now = Utc::now();
    db.assign_song(USER, "amazing-grace", now);
    db.orchestrator()
        .submit_review(USER, &chunks[0].id, Rating::NailedIt, now)
        .unwrap();

    // Corrected lyrics for the same chunk id
    let corrected = TestDataFactory::chunk(
        "amazing-grace",
        &chunks[0].id,
        "Verse 1",
        0,
        &["Amazing grace, how sweet the sound", "That saved a soul like me"],
    );
    db.storage.register_chunk(&corrected).unwrap();

    let progress = db.storage.get_progress(USER, &chunks[0].id).unwrap().unwrap();
    assert_eq!(progress.review_count, 1);
    let stored = db.storage.get_chunk(&chunks[0].id).unwrap().unwrap();
    assert_eq!(stored.lines.len(), 2);
}
