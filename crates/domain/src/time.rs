//! Time and timestamp helpers.

use chrono::{DateTime, Local, Utc};

/// UTC timestamp used for audit records and generated ids.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Return the current local wall-clock time.
///
/// Schedule matching works on the local clock: task times are what the
/// user reads on the wall, not UTC.
#[must_use]
pub fn local_now() -> DateTime<Local> {
    Local::now()
}

/// Format a local time as the `HH:MM` minute key used by the scheduler.
#[must_use]
pub fn minute_of(ts: &DateTime<Local>) -> String {
    ts.format("%H:%M").to_string()
}
