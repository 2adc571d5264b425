// Wall-clock stamp shared by every file written in one generation pass.

use chrono::{DateTime, FixedOffset, Local, Timelike};
use serde::{Deserialize, Serialize};

/// A moment in local time, captured once and reused so that file names,
/// headers and JSON fields written together agree with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp(DateTime<FixedOffset>);

impl Stamp {
    pub fn now() -> Self {
        Self(Local::now().fixed_offset())
    }

    pub fn from_datetime(at: DateTime<FixedOffset>) -> Self {
        Self(at)
    }

    /// Local ISO-8601 without an offset. Microseconds are printed only when
    /// non-zero (`2024-05-01T09:30:00` or `2024-05-01T09:30:00.250000`).
    pub fn iso(&self) -> String {
        let local = self.0.naive_local();
        if local.nanosecond() / 1_000 == 0 {
            local.format("%Y-%m-%dT%H:%M:%S").to_string()
        } else {
            local.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
        }
    }

    /// Whole seconds since the Unix epoch, used as a file name suffix.
    pub fn unix_secs(&self) -> i64 {
        self.0.timestamp()
    }
}

#[cfg(test)]
pub(crate) fn fixed_stamp() -> Stamp {
    let at = DateTime::parse_from_rfc3339("2024-05-01T09:30:15.250+02:00")
        .expect("fixed timestamp should parse");
    Stamp::from_datetime(at)
}
