//! Date and duration formatting for call history rows.

use chrono::{DateTime, Datelike, Local, NaiveDateTime, Utc};
use std::time::Duration;

use crate::engine::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallDirection {
    Incoming,
    Outgoing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Success,
    Missed,
    Declined,
    Aborted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallLogEntry {
    pub remote: Address,
    pub direction: CallDirection,
    pub status: CallStatus,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
}

impl CallLogEntry {
    /// Name shown for the remote party.
    pub fn display_name(&self) -> String {
        self.remote
            .display_name
            .clone()
            .or_else(|| self.remote.username.clone())
            .unwrap_or_else(|| self.remote.as_string_uri_only())
    }

    /// One-line description relative to `now`, in local time.
    pub fn summary(&self, now: DateTime<Local>) -> String {
        let started = self.started_at.with_timezone(&Local).naive_local();
        let when = format_call_date(started, now.naive_local());
        let arrow = match self.direction {
            CallDirection::Incoming => "←",
            CallDirection::Outgoing => "→",
        };
        let detail = match self.status {
            CallStatus::Success => format_duration(self.duration),
            CallStatus::Missed => "Missed".to_string(),
            CallStatus::Declined => "Declined".to_string(),
            CallStatus::Aborted => "Aborted".to_string(),
        };
        format!("{} {} • {} • {}", arrow, self.display_name(), when, detail)
    }
}

/// `HH:MM` today, `Yesterday`, `d Mon` this year, `d Mon YYYY` before.
pub fn format_call_date(timestamp: NaiveDateTime, now: NaiveDateTime) -> String {
    let day = timestamp.date();
    let today = now.date();

    if day == today {
        timestamp.format("%H:%M").to_string()
    } else if today.pred_opt() == Some(day) {
        "Yesterday".to_string()
    } else if day.year() == today.year() {
        timestamp.format("%-d %b").to_string()
    } else {
        timestamp.format("%-d %b %Y").to_string()
    }
}

/// `MM:SS`, or `H:MM:SS` once the call reaches an hour.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else {
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}
