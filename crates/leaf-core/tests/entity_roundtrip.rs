//! Serde roundtrip and JsonSchema validation tests for all entity types.

use chrono::{NaiveDate, TimeZone, Utc};
use schemars::schema_for;
use leaf_core::entities::*;
use leaf_core::enums::TimerStatus;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            // Serde roundtrip
            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            // Schema validation
            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn jan(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

roundtrip_and_validate!(
    open_session_roundtrip,
    ReadingSession,
    ReadingSession::open(
        "rs-lr4x9k2a-a3f8b2c1".into(),
        "user-1",
        "book-dune",
        12,
        Utc.with_ymd_and_hms(2024, 1, 3, 20, 15, 0).unwrap(),
        jan(3),
    )
);

roundtrip_and_validate!(closed_session_roundtrip, ReadingSession, {
    let start = Utc.with_ymd_and_hms(2024, 1, 3, 20, 15, 0).unwrap();
    let mut session = ReadingSession::open(
        "rs-lr4x9k2a-a3f8b2c1".into(),
        "user-1",
        "book-dune",
        12,
        start,
        jan(3),
    );
    session.close(start + chrono::TimeDelta::minutes(25), 40, 1_500);
    session
});

roundtrip_and_validate!(
    timer_snapshot_roundtrip,
    TimerSnapshot,
    TimerSnapshot {
        session_seconds: 120,
        is_running: true,
        is_paused: false,
        current_session_id: Some("rs-lr4x9k2a-a3f8b2c1".into()),
        start_page: 12,
        selected_book_id: Some("book-dune".into()),
        last_update_time: Utc.with_ymd_and_hms(2024, 1, 3, 20, 17, 0).unwrap(),
    }
);

roundtrip_and_validate!(
    idle_snapshot_roundtrip,
    TimerSnapshot,
    TimerSnapshot {
        session_seconds: 0,
        is_running: false,
        is_paused: false,
        current_session_id: None,
        start_page: 0,
        selected_book_id: None,
        last_update_time: Utc.with_ymd_and_hms(2024, 1, 3, 20, 17, 0).unwrap(),
    }
);

roundtrip_and_validate!(
    reading_stats_roundtrip,
    ReadingStats,
    ReadingStats {
        total_seconds_read: 360,
        total_minutes_read: 6,
        total_pages_read: 48,
        total_sessions: 3,
        average_session_duration: 120,
        books_started: 2,
        current_streak: 3,
        longest_streak: 5,
        last_read_date: Some(jan(3)),
    }
);

roundtrip_and_validate!(
    today_stats_roundtrip,
    TodayStats,
    TodayStats {
        date: jan(3),
        sessions: 2,
        total_seconds: 1_500,
        total_minutes: 25,
    }
);

roundtrip_and_validate!(
    daily_total_roundtrip,
    DailyTotal,
    DailyTotal {
        date: jan(2),
        sessions: 1,
        total_seconds: 600,
        pages_read: 14,
    }
);

roundtrip_and_validate!(timer_status_roundtrip, TimerStatus, TimerStatus::Paused);

#[test]
fn snapshot_uses_camel_case_keys() {
    let snap = TimerSnapshot {
        session_seconds: 5,
        is_running: true,
        is_paused: false,
        current_session_id: None,
        start_page: 1,
        selected_book_id: None,
        last_update_time: Utc.with_ymd_and_hms(2024, 1, 3, 20, 17, 0).unwrap(),
    };
    let json = serde_json::to_value(&snap).unwrap();
    for key in [
        "sessionSeconds",
        "isRunning",
        "isPaused",
        "currentSessionId",
        "startPage",
        "selectedBookId",
        "lastUpdateTime",
    ] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }
}
