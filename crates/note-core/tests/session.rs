use chrono::Utc;
use mononote_core::{
    SessionRecord, format_duration, format_time_in, format_timestamp_in, session_rows_in,
};

#[test]
fn ticking_tracks_elapsed_seconds_from_open() {
    let mut session = SessionRecord::start(10_000);
    assert!(session.is_active());
    assert_eq!(session.duration_seconds, 0.0);

    session.tick(12_500);
    assert_eq!(session.duration_seconds, 2.5);

    session.tick(9_000);
    assert_eq!(session.duration_seconds, 0.0);
}

#[test]
fn closed_snapshot_leaves_live_session_running() {
    let mut session = SessionRecord::start(1_000);
    session.tick(2_000);

    let snapshot = session.closed_at(4_000);

    assert_eq!(snapshot.close_timestamp, Some(4_000));
    assert_eq!(snapshot.duration_seconds, 3.0);
    assert!(!snapshot.modified);
    assert!(session.is_active());
    assert_eq!(session.duration_seconds, 1.0);

    session.mark_modified();
    assert!(session.closed_at(5_000).modified);
    assert_eq!(session.status_label(), "EDITED");
    assert_eq!(snapshot.status_label(), "VIEWED");
}

#[test]
fn durations_read_like_prose() {
    assert_eq!(format_duration(0.0), "0.0s");
    assert_eq!(format_duration(0.44), "0.4s");
    assert_eq!(format_duration(1.0), "1 second");
    assert_eq!(format_duration(65.2), "1 minute 5 seconds");
    assert_eq!(format_duration(3_600.0), "1 hour");
    assert_eq!(format_duration(7_322.0), "2 hours 2 minutes 2 seconds");
    assert_eq!(format_duration(90_061.0), "1 day 1 hour 1 minute 1 second");
}

#[test]
fn timestamps_use_month_day_year_and_twelve_hour_clock() {
    assert_eq!(format_timestamp_in(0, &Utc), "Jan 1, 1970 • 12:00 AM");
    assert_eq!(
        format_timestamp_in(1_700_000_000_000, &Utc),
        "Nov 14, 2023 • 10:13 PM"
    );
    assert_eq!(format_time_in(1_700_000_000_000, &Utc), "10:13 PM");
}

#[test]
fn history_rows_are_newest_first_with_live_session_active() {
    let past = vec![
        SessionRecord {
            open_timestamp: 0,
            close_timestamp: Some(65_000),
            duration_seconds: 65.0,
            modified: true,
        },
        SessionRecord {
            open_timestamp: 3_600_000,
            close_timestamp: Some(3_600_400),
            duration_seconds: 0.4,
            modified: false,
        },
    ];
    let mut current = SessionRecord::start(7_200_000);
    current.tick(7_203_000);

    let rows = session_rows_in(&past, Some(&current), &Utc);

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].opened, "Jan 1, 1970 • 2:00 AM");
    assert_eq!(rows[0].closed, "Active");
    assert_eq!(rows[0].duration, "3 seconds");
    assert_eq!(rows[1].duration, "0.4s");
    assert_eq!(rows[1].status, "VIEWED");
    assert_eq!(rows[1].closed, "1:00 AM");
    assert_eq!(rows[2].closed, "12:01 AM");
    assert_eq!(rows[2].status, "EDITED");
}
