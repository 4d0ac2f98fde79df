use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One period during which a note was open. Timestamps are Unix milliseconds
/// so files stay readable by other tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub open_timestamp: i64,
    #[serde(default)]
    pub close_timestamp: Option<i64>,
    #[serde(default)]
    pub duration_seconds: f64,
    #[serde(default)]
    pub modified: bool,
}

impl SessionRecord {
    pub fn start(now_ms: i64) -> Self {
        Self {
            open_timestamp: now_ms,
            close_timestamp: None,
            duration_seconds: 0.0,
            modified: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.close_timestamp.is_none()
    }

    pub fn tick(&mut self, now_ms: i64) {
        self.duration_seconds = elapsed_seconds(self.open_timestamp, now_ms);
    }

    pub fn mark_modified(&mut self) {
        self.modified = true;
    }

    /// Copy of this session closed at `now_ms`, as written into a saved file.
    /// The live session itself keeps running.
    pub fn closed_at(&self, now_ms: i64) -> Self {
        Self {
            open_timestamp: self.open_timestamp,
            close_timestamp: Some(now_ms),
            duration_seconds: elapsed_seconds(self.open_timestamp, now_ms),
            modified: self.modified,
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.modified { "EDITED" } else { "VIEWED" }
    }
}

fn elapsed_seconds(from_ms: i64, to_ms: i64) -> f64 {
    (to_ms - from_ms).max(0) as f64 / 1000.0
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// `1 hour 2 minutes 5 seconds`; sub-second spans fall back to `0.4s`.
pub fn format_duration(seconds: f64) -> String {
    let whole = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let parts: Vec<String> = [
        (whole / 86_400, "day"),
        (whole % 86_400 / 3_600, "hour"),
        (whole % 3_600 / 60, "minute"),
        (whole % 60, "second"),
    ]
    .into_iter()
    .filter(|(value, _)| *value > 0)
    .map(|(value, unit)| {
        if value == 1 {
            format!("{value} {unit}")
        } else {
            format!("{value} {unit}s")
        }
    })
    .collect();

    if parts.is_empty() {
        format!("{seconds:.1}s")
    } else {
        parts.join(" ")
    }
}

/// `Mar 4, 2025 • 3:07 PM` in the given zone.
pub fn format_timestamp_in<Tz>(ms: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match DateTime::<Utc>::from_timestamp_millis(ms) {
        Some(at) => at.with_timezone(tz).format("%b %-d, %Y • %-I:%M %p").to_string(),
        None => "Invalid date".to_string(),
    }
}

/// `3:07 PM` in the given zone. Used for close times, which sit next to the
/// full open timestamp.
pub fn format_time_in<Tz>(ms: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match DateTime::<Utc>::from_timestamp_millis(ms) {
        Some(at) => at.with_timezone(tz).format("%-I:%M %p").to_string(),
        None => "Invalid date".to_string(),
    }
}

pub fn format_timestamp(ms: i64) -> String {
    format_timestamp_in(ms, &Local)
}

/// One row of the session history listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRow {
    pub opened: String,
    pub closed: String,
    pub duration: String,
    pub status: &'static str,
}

/// Past sessions followed by the live one, newest first.
pub fn session_rows_in<Tz>(
    past: &[SessionRecord],
    current: Option<&SessionRecord>,
    tz: &Tz,
) -> Vec<SessionRow>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    past.iter()
        .chain(current)
        .rev()
        .map(|session| SessionRow {
            opened: format_timestamp_in(session.open_timestamp, tz),
            closed: match session.close_timestamp {
                Some(ms) => format_time_in(ms, tz),
                None => "Active".to_string(),
            },
            duration: format_duration(session.duration_seconds),
            status: session.status_label(),
        })
        .collect()
}

pub fn session_rows(past: &[SessionRecord], current: Option<&SessionRecord>) -> Vec<SessionRow> {
    session_rows_in(past, current, &Local)
}
