//! # Scheduling Journeys
//!
//! Review outcomes as a singer sees them through the orchestrator and a real
//! database: first success, repeated struggles, reaching mastery, and which
//! chunks show up in the due queue.

use chrono::{Duration, Utc};
use refrain_core::{
    FadeLevel, MemoryStatus, MemoryStatusClassifier, ProgressStore, Rating,
};
use refrain_e2e_tests::TestDatabaseManager;

const USER: &str = "singer";

#[test]
fn test_fresh_chunk_nailed_it() {
    let db = TestDatabaseManager::new_temp();
    let chunks = db.seed_hymn();
    let now = Utc::now();
    let fresh = db.storage.assign_chunk(USER, &chunks[0].id, now).unwrap();

    assert_eq!(fresh.fade_level, FadeLevel::MIN);
    assert_eq!(fresh.memory_strength, 0.0);
    assert_eq!(fresh.ease_factor, 2.5);
    assert_eq!(fresh.interval_days, 1);
    assert_eq!(fresh.review_count, 0);
    assert_eq!(fresh.status(), MemoryStatus::Fragile);

    let outcome = db
        .orchestrator()
        .submit_review(USER, &chunks[0].id, Rating::NailedIt, now)
        .unwrap();

    let p = &outcome.progress;
    assert_eq!(p.review_count, 1);
    assert_eq!(p.fade_level.get(), 1);
    assert_eq!(p.interval_days, 1);
    assert!(matches!(p.status(), MemoryStatus::Fragile | MemoryStatus::Shaky));
    assert!(!outcome.extra_practice);
    assert_eq!(outcome.xp_earned, 10);
}

#[test]
fn test_five_struggles_stay_fragile() {
    let db = TestDatabaseManager::new_temp();
    let chunks = db.seed_hymn();
    let orchestrator = db.orchestrator();
    let mut now = Utc::now();
    db.storage.assign_chunk(USER, &chunks[1].id, now).unwrap();

    let mut last_strength = f64::MAX;
    for _ in 0..5 {
        let outcome = orchestrator
            .submit_review(USER, &chunks[1].id, Rating::Struggling, now)
            .unwrap();
        let p = &outcome.progress;
        assert_eq!(p.fade_level, FadeLevel::MIN);
        assert_eq!(p.interval_days, 1);
        assert!(p.memory_strength <= last_strength);
        assert_eq!(p.status(), MemoryStatus::Fragile);
        last_strength = p.memory_strength;
        now = p.next_review_at;
    }

    assert_eq!(last_strength, 0.0);
    let history = db.storage.review_history(USER, Some(&chunks[1].id), 10).unwrap();
    assert_eq!(history.len(), 5);
    assert!(history.iter().all(|e| e.rating == Rating::Struggling));
}

#[test]
fn test_on_time_successes_reach_locked_in() {
    let db = TestDatabaseManager::new_temp();
    let chunks = db.seed_hymn();
    let orchestrator = db.orchestrator();
    let mut now = Utc::now();
    db.storage.assign_chunk(USER, &chunks[2].id, now).unwrap();

    let mut statuses = Vec::new();
    for _ in 0..5 {
        let outcome = orchestrator
            .submit_review(USER, &chunks[2].id, Rating::NailedIt, now)
            .unwrap();
        statuses.push(outcome.progress.status());
        now = outcome.progress.next_review_at;
    }

    let stored = db.storage.get_progress(USER, &chunks[2].id).unwrap().unwrap();
    assert_eq!(stored.fade_level, FadeLevel::MAX);
    assert!(stored.memory_strength >= 85.0);
    assert_eq!(stored.status(), MemoryStatus::LockedIn);

    // Status never regresses along a run of successes
    assert!(statuses.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_locked_in_requires_full_concealment() {
    let classifier = MemoryStatusClassifier::default();
    let clean = [Rating::NailedIt; 5];

    let full = classifier.classify(90.0, FadeLevel::MAX, 12, &clean);
    assert_eq!(full, MemoryStatus::LockedIn);

    let partial = classifier.classify(90.0, FadeLevel::new(3).unwrap(), 12, &clean);
    assert!(partial <= MemoryStatus::Solid);

    let mut shaky_history = clean;
    shaky_history[4] = Rating::Struggling;
    let struggled = classifier.classify(90.0, FadeLevel::MAX, 12, &shaky_history);
    assert!(struggled <= MemoryStatus::Solid);
}

#[test]
fn test_due_queue_returns_only_due_chunks_in_order() {
    let db = TestDatabaseManager::new_temp();
    let chunks = db.seed_song("anthem", 3);
    let now = Utc::now();

    // Later position due earlier, so time order wins over song order
    db.storage
        .assign_chunk(USER, &chunks[2].id, now - Duration::hours(3))
        .unwrap();
    db.storage
        .assign_chunk(USER, &chunks[0].id, now - Duration::hours(1))
        .unwrap();
    db.storage
        .assign_chunk(USER, &chunks[1].id, now + Duration::days(1))
        .unwrap();

    let queue = db.orchestrator().due_queue(USER, now).unwrap();
    let ids: Vec<_> = queue.iter().map(|d| d.chunk.id.as_str()).collect();
    assert_eq!(ids, vec![chunks[2].id.as_str(), chunks[0].id.as_str()]);
    assert!(queue[0].progress.next_review_at <= queue[1].progress.next_review_at);
}

#[test]
fn test_due_queue_ties_follow_song_order() {
    let db = TestDatabaseManager::new_temp();
    db.seed_hymn();
    let now = Utc::now();
    db.assign_song(USER, "amazing-grace", now);

    let queue = db.orchestrator().due_queue(USER, now).unwrap();
    let labels: Vec<_> = queue.iter().map(|d| d.chunk.label.as_str()).collect();
    assert_eq!(labels, vec!["Verse 1", "Verse 2", "Verse 3"]);
}

#[test]
fn test_users_do_not_share_progress() {
    let db = TestDatabaseManager::new_temp();
    let chunks = db.seed_hymn();
    let now = Utc::now();
    db.assign_song("alto", "amazing-grace", now);
    db.assign_song("tenor", "amazing-grace", now);

    db.orchestrator()
        .submit_review("alto", &chunks[0].id, Rating::NailedIt, now)
        .unwrap();

    let tenor = db.storage.get_progress("tenor", &chunks[0].id).unwrap().unwrap();
    assert_eq!(tenor.review_count, 0);
    assert_eq!(db.orchestrator().due_queue("alto", now).unwrap().len(), 2);
    assert_eq!(db.orchestrator().due_queue("tenor", now).unwrap().len(), 3);
}
