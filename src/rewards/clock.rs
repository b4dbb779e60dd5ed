//! Time source and day keys
//!
//! Day keys are `YYYY-MM-DD` in a fixed timezone (Europe/London by default),
//! falling back to the host's local date when no timezone is configured.

use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;

/// Default timezone used for "today" buckets
pub const DEFAULT_TIMEZONE: &str = "Europe/London";

/// Source of the current time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant, for tests and replays
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Parse a timezone name, logging and returning `None` if unknown
pub fn parse_timezone(name: &str) -> Option<Tz> {
    match name.parse::<Tz>() {
        Ok(tz) => Some(tz),
        Err(_) => {
            tracing::warn!("Unknown timezone '{}', using local date for day keys", name);
            None
        }
    }
}

/// Day key for `now` in `tz`, or in the host local timezone without one
pub fn day_key(now: DateTime<Utc>, tz: Option<Tz>) -> String {
    match tz {
        Some(tz) => now.with_timezone(&tz).format("%Y-%m-%d").to_string(),
        None => now.with_timezone(&Local).format("%Y-%m-%d").to_string(),
    }
}
