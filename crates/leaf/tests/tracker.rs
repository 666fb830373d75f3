use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};
use leaf::{LeafConfig, ReadingTracker, StopOutcome, TimerStatus, TrackerError};
use leaf_core::clock::ManualClock;
use leaf_store::MemorySessionRepository;
use pretty_assertions::assert_eq;
use tokio::time::sleep;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 3, 19, 0, 0).unwrap()
}

fn tracker() -> (ReadingTracker<MemorySessionRepository, ManualClock>, ManualClock) {
    let clock = ManualClock::new(t0());
    (
        ReadingTracker::in_memory(clock.clone(), &LeafConfig::default()),
        clock,
    )
}

#[tokio::test(start_paused = true)]
async fn full_reading_flow() {
    let (tracker, clock) = tracker();
    let id = tracker.start_session("user-1", "book-1", 10).unwrap();
    assert_eq!(tracker.timer_view("user-1").status, TimerStatus::Running);

    sleep(Duration::from_millis(30_500)).await;
    tracker.pause_session("user-1").unwrap();
    sleep(Duration::from_secs(60)).await;
    tracker.resume_session("user-1").unwrap();
    sleep(Duration::from_millis(30_200)).await;
    clock.advance(TimeDelta::minutes(2));

    let StopOutcome::Saved(session) = tracker.stop_session("user-1", 22).unwrap() else {
        panic!("session should be saved");
    };
    assert_eq!(session.id, id);
    assert_eq!(session.duration, 60);
    assert_eq!(session.pages_read, 12);
    assert_eq!(tracker.timer_view("user-1").status, TimerStatus::Idle);

    let stats = tracker.get_user_stats("user-1");
    assert_eq!(stats.total_sessions, 1);
    assert_eq!(stats.total_seconds_read, 60);
    assert_eq!(stats.total_minutes_read, 1);
    assert_eq!(stats.total_pages_read, 12);
    assert_eq!(stats.current_streak, 1);
    assert_eq!(
        stats.last_read_date,
        Some(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap())
    );

    let today = tracker.get_today_stats("user-1");
    assert_eq!(today.sessions, 1);
    assert_eq!(today.total_seconds, 60);

    let week = tracker.recent_daily_totals("user-1");
    assert_eq!(week.len(), 7);
    assert_eq!(week.last().unwrap().total_seconds, 60);
    assert!(week[..6].iter().all(|d| d.sessions == 0));
}

#[tokio::test(start_paused = true)]
async fn users_have_independent_timers() {
    let (tracker, _clock) = tracker();
    tracker.start_session("alice", "book-1", 0).unwrap();
    sleep(Duration::from_millis(2_500)).await;
    tracker.start_session("bob", "book-2", 0).unwrap();
    sleep(Duration::from_millis(1_000)).await;

    assert_eq!(tracker.timer_view("alice").session_seconds, 3);
    assert_eq!(tracker.timer_view("bob").session_seconds, 1);

    tracker.stop_session("alice", 5).unwrap();
    assert_eq!(tracker.timer_view("bob").status, TimerStatus::Running);
    assert_eq!(tracker.get_user_sessions("alice").len(), 1);
    assert_eq!(tracker.get_book_sessions("bob", "book-2").len(), 1);
    assert!(tracker.get_book_sessions("bob", "book-1").is_empty());
}

#[tokio::test(start_paused = true)]
async fn invalid_operations_surface_timer_errors() {
    let (tracker, _clock) = tracker();
    assert!(matches!(
        tracker.pause_session("user-1"),
        Err(TrackerError::Timer(_))
    ));
    assert!(matches!(
        tracker.stop_session("user-1", 1),
        Err(TrackerError::Timer(_))
    ));
    tracker.start_session("user-1", "book-1", 0).unwrap();
    assert!(matches!(
        tracker.start_session("user-1", "book-1", 0),
        Err(TrackerError::Timer(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn discard_leaves_no_history() {
    let (tracker, _clock) = tracker();
    tracker.start_session("user-1", "book-1", 0).unwrap();
    sleep(Duration::from_secs(5)).await;
    tracker.discard_session("user-1").unwrap();

    assert!(tracker.get_user_sessions("user-1").is_empty());
    assert_eq!(tracker.get_user_stats("user-1"), leaf::ReadingStats::default());
}

#[tokio::test(start_paused = true)]
async fn suspend_and_resume_reconcile_all_timers() {
    let (tracker, clock) = tracker();
    tracker.start_session("alice", "book-1", 0).unwrap();
    tracker.start_session("bob", "book-2", 0).unwrap();
    sleep(Duration::from_millis(10_050)).await;

    tracker.on_suspend();
    clock.advance(TimeDelta::minutes(5));
    tracker.on_resume();

    assert_eq!(tracker.timer_view("alice").session_seconds, 310);
    assert_eq!(tracker.timer_view("bob").session_seconds, 310);
}

#[tokio::test(start_paused = true)]
async fn session_survives_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = LeafConfig::default();
    config.storage.data_dir = Some(dir.path().to_path_buf());

    let clock = ManualClock::new(t0());
    let id = {
        let repo = std::sync::Arc::new(leaf_store::FileSessionRepository::with_config(
            leaf_store::FileStore::open(dir.path()).unwrap(),
            &config.storage,
        ));
        let tracker = ReadingTracker::new(repo, clock.clone(), &config);
        let id = tracker.start_session("user-1", "book-1", 3).unwrap();
        sleep(Duration::from_millis(42_050)).await;
        tracker.on_suspend();
        id
    };

    // The process is gone for ten minutes.
    clock.advance(TimeDelta::minutes(10));

    let repo = std::sync::Arc::new(leaf_store::FileSessionRepository::with_config(
        leaf_store::FileStore::open(dir.path()).unwrap(),
        &config.storage,
    ));
    let tracker = ReadingTracker::new(repo, clock.clone(), &config);
    let view = tracker.timer_view("user-1");
    assert_eq!(view.status, TimerStatus::Running);
    assert_eq!(view.session_id.as_deref(), Some(id.as_str()));
    assert_eq!(view.session_seconds, 642);

    let StopOutcome::Saved(session) = tracker.stop_session("user-1", 40).unwrap() else {
        panic!("restored session should be saved");
    };
    assert_eq!(session.duration, 642);
    assert_eq!(session.pages_read, 37);
    assert!(!dir.path().join("timer_state_user-1.json").exists());
}

#[tokio::test]
async fn open_uses_configured_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = LeafConfig::default();
    config.storage.data_dir = Some(dir.path().join("nested"));

    let tracker = ReadingTracker::open(&config).unwrap();
    assert!(tracker.get_user_sessions("user-1").is_empty());
    assert!(dir.path().join("nested").is_dir());
}
