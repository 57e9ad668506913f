//! Time source for snapshot generation
//!
//! The generator only needs the current timestamp and the hour of day. Tests
//! pin both with [`FixedClock`].

use chrono::{DateTime, FixedOffset, Local, TimeZone, Timelike, Utc};

/// Source of wall-clock time
pub trait Clock: Send + Sync {
    /// Current time
    fn now(&self) -> DateTime<FixedOffset>;

    /// Epoch milliseconds
    fn timestamp_ms(&self) -> i64 {
        self.now().timestamp_millis()
    }

    /// Hour of day in local time, 0-23
    fn hour_of_day(&self) -> u32 {
        self.now().hour() % 24
    }
}

/// Local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<FixedOffset>,
}

impl FixedClock {
    /// Freeze at an arbitrary instant
    pub fn new(instant: DateTime<FixedOffset>) -> Self {
        Self { instant }
    }

    /// Freeze at `hour`:00 UTC on a fixed day. Hours past 23 wrap.
    pub fn at_hour(hour: u32) -> Self {
        let instant = Utc
            .with_ymd_and_hms(2024, 6, 1, hour % 24, 0, 0)
            .single()
            .unwrap_or_default();
        Self {
            instant: instant.fixed_offset(),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.instant
    }
}
