//! # Practice Session Journeys
//!
//! 1. Assign a song, practice every due chunk, read the summary
//! 2. Practice early (extra practice) and check what it changes
//! 3. Peek at outcomes before rating

use chrono::{Duration, Utc};
use refrain_core::{
    render_line, FadeLevel, MemoryStatus, ProgressStore, Rating, WordState,
};
use refrain_e2e_tests::TestDatabaseManager;

const USER: &str = "soprano";

#[test]
fn test_full_session_over_a_song() {
    let db = TestDatabaseManager::new_temp();
    let chunks = db.seed_hymn();
    let now = Utc::now();
    let assigned = db.assign_song(USER, "amazing-grace", now);
    assert_eq!(assigned.len(), 3);

    let orchestrator = db.orchestrator();
    let mut session = orchestrator.start_session(USER, now).unwrap();
    assert_eq!(session.remaining(), 3);

    // Level 0: every word shows as written
    let plan = session.current_plan().unwrap();
    let first = session.current().unwrap();
    assert_eq!(
        render_line(first.chunk.lines[0].as_slice(), &plan[0]),
        "Amazing grace! How sweet the sound"
    );

    session.submit(Rating::NailedIt, now).unwrap();
    session.submit(Rating::Almost, now).unwrap();
    session.submit(Rating::Struggling, now).unwrap();
    assert!(session.current().is_none());

    let summary = session.finish(now);
    assert_eq!(summary.chunks_reviewed, 3);
    assert_eq!(summary.extra_practice, 0);
    assert_eq!(summary.total_xp, 10 + 5 + 2);
    assert!(!summary.has_failures());

    // Only the nailed chunk gained enough strength to move off fragile
    assert_eq!(summary.improvements.len(), 1);
    assert_eq!(summary.improvements[0].chunk_label, "Verse 1");
    assert_eq!(summary.improvements[0].old_status, MemoryStatus::Fragile);

    assert!(orchestrator.due_queue(USER, now).unwrap().is_empty());
    let tomorrow = now + Duration::days(1);
    assert_eq!(orchestrator.due_queue(USER, tomorrow).unwrap().len(), 3);

    let stats = db.storage.user_stats(USER, now).unwrap();
    assert_eq!(stats.total_chunks, chunks.len());
    assert_eq!(stats.total_reviews, 3);
    assert_eq!(stats.total_xp, 17);
    assert_eq!(stats.due_now, 0);
}

#[test]
fn test_extra_practice_counts_but_keeps_schedule() {
    let db = TestDatabaseManager::new_temp();
    let chunks = db.seed_hymn();
    let orchestrator = db.orchestrator();
    let now = Utc::now();
    db.storage.assign_chunk(USER, &chunks[0].id, now).unwrap();

    let first = orchestrator
        .submit_review(USER, &chunks[0].id, Rating::NailedIt, now)
        .unwrap();

    let early = now + Duration::hours(2);
    let extra = orchestrator
        .submit_review(USER, &chunks[0].id, Rating::NailedIt, early)
        .unwrap();

    assert!(extra.extra_practice);
    assert_eq!(extra.xp_earned, 10);
    assert_eq!(extra.progress.review_count, 2);
    assert_eq!(extra.progress.interval_days, first.progress.interval_days);
    assert_eq!(extra.progress.fade_level, first.progress.fade_level);
    assert_eq!(extra.progress.next_review_at, first.progress.next_review_at);
    assert_eq!(extra.progress.memory_strength, first.progress.memory_strength);
    assert_eq!(extra.progress.recent_ratings.len(), 2);

    let history = db.storage.review_history(USER, Some(&chunks[0].id), 10).unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].extra_practice);
    assert!(!history[1].extra_practice);
}

#[test]
fn test_early_struggle_still_regresses() {
    let db = TestDatabaseManager::new_temp();
    let chunks = db.seed_hymn();
    let orchestrator = db.orchestrator();
    let now = Utc::now();
    db.storage.assign_chunk(USER, &chunks[1].id, now).unwrap();

    orchestrator
        .submit_review(USER, &chunks[1].id, Rating::NailedIt, now)
        .unwrap();

    let early = now + Duration::hours(1);
    let outcome = orchestrator
        .submit_review(USER, &chunks[1].id, Rating::Struggling, early)
        .unwrap();

    assert_eq!(outcome.progress.fade_level, FadeLevel::MIN);
    assert_eq!(outcome.progress.interval_days, 1);
    assert_eq!(outcome.progress.repetitions, 0);
    assert!(outcome.progress.next_review_at > early);
}

#[test]
fn test_preview_then_rate_matches() {
    let db = TestDatabaseManager::new_temp();
    let chunks = db.seed_hymn();
    let orchestrator = db.orchestrator();
    let now = Utc::now();
    db.storage.assign_chunk(USER, &chunks[2].id, now).unwrap();

    let (current, preview) = orchestrator.preview(USER, &chunks[2].id, now).unwrap();
    assert_eq!(current.review_count, 0);

    // Nothing persisted by the preview
    let stored = db.storage.get_progress(USER, &chunks[2].id).unwrap().unwrap();
    assert_eq!(stored.version, current.version);

    let outcome = orchestrator
        .submit_review(USER, &chunks[2].id, Rating::Almost, now)
        .unwrap();
    assert_eq!(outcome.progress.interval_days, preview.almost.progress.interval_days);
    assert_eq!(outcome.progress.fade_level, preview.almost.progress.fade_level);
    assert_eq!(outcome.progress.status(), preview.almost.progress.status());
}

#[test]
fn test_reveal_does_not_change_stored_plan() {
    let db = TestDatabaseManager::new_temp();
    let chunks = db.seed_hymn();
    let orchestrator = db.orchestrator();
    let mut now = Utc::now();
    db.storage.assign_chunk(USER, &chunks[0].id, now).unwrap();

    for _ in 0..4 {
        let outcome = orchestrator
            .submit_review(USER, &chunks[0].id, Rating::NailedIt, now)
            .unwrap();
        now = outcome.progress.next_review_at;
    }

    let mut session = orchestrator.start_session(USER, now).unwrap();
    let stored_plan = orchestrator.plan_for(session.current().unwrap());
    let (line, word) = stored_plan
        .iter()
        .enumerate()
        .find_map(|(l, plan)| plan.iter().position(|w| w.is_concealed()).map(|w| (l, w)))
        .expect("level 4 conceals words");

    session.reveal(line, word);
    assert_eq!(session.current_plan().unwrap()[line][word].state(), WordState::Visible);
    drop(session);

    let again = orchestrator.start_session(USER, now).unwrap();
    assert_eq!(again.current_plan().unwrap(), stored_plan);
}

#[test]
fn test_plans_are_stable_across_orchestrators() {
    let db = TestDatabaseManager::new_temp();
    let chunks = db.seed_hymn();
    let level = FadeLevel::new(3).unwrap();

    let a = db.orchestrator().plan_at(&chunks[1].id, level).unwrap();
    let b = db.orchestrator().plan_at(&chunks[1].id, level).unwrap();
    assert_eq!(a, b);
}
