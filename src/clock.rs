//! Wall-clock access and the two timestamp formats the widget shows.

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// India Standard Time, the default display zone.
pub const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// The system clock, shifted into a fixed display zone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(ist())
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

pub fn ist() -> FixedOffset {
    offset_from_minutes(IST_OFFSET_SECS / 60)
}

/// Offset for a number of minutes east of UTC. Out-of-range values fall back
/// to UTC.
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| {
            tracing::warn!(minutes, "invalid UTC offset, using UTC");
            Utc.fix()
        })
}

/// Timestamp embedded in alert messages: `18/10/2026, 2:05:09 pm`.
///
/// Day and month are not zero-padded: `2/1/2026, 12:30:00 am`.
pub fn format_timestamp(now: &DateTime<FixedOffset>) -> String {
    now.format("%-d/%-m/%Y, %-I:%M:%S %P").to_string()
}

/// Ticking clock line: `Sun, 18 Oct 2026, 02:05:09 pm +05:30`.
pub fn format_clock(now: &DateTime<FixedOffset>) -> String {
    now.format("%a, %-d %b %Y, %I:%M:%S %P %:z").to_string()
}
