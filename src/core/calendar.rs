//! Clocks and calendar-day windows
//!
//! Pickup numbers, order listings and sales reports are all bucketed by the
//! server's calendar day. A day is the half-open interval
//! `[date 00:00, date+1 00:00)` in the configured UTC offset.

use crate::core::error::ValidationError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, TimeDelta, Utc};
use regex::Regex;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

/// Source of the current instant
pub trait Clock: Send + Sync {
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

/// A clock that only moves when told to
///
/// Used by tests and demos to pin "today".
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Jump to a specific instant
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    /// Move forward by `delta`
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// One calendar day as a half-open UTC interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub date: NaiveDate,
    /// Inclusive lower bound (local midnight)
    pub start: DateTime<Utc>,
    /// Exclusive upper bound (next local midnight)
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Window for a calendar date in the given offset
    pub fn for_date(date: NaiveDate, offset: FixedOffset) -> Self {
        let local_midnight = date.and_time(NaiveTime::MIN);
        let utc_midnight =
            local_midnight - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
        let start = utc_midnight.and_utc();
        Self {
            date,
            start,
            end: start + TimeDelta::days(1),
        }
    }

    /// Window of the local day that contains `instant`
    pub fn containing(instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self::for_date(instant.with_timezone(&offset).date_naive(), offset)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

impl fmt::Display for DayWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format("%Y-%m-%d"))
    }
}

/// Parse a strict, zero-padded `YYYY-MM-DD` date
///
/// `2024-11-2` is rejected even though it names a real day.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    static DATE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = DATE_REGEX.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

    let invalid = || ValidationError::InvalidDate {
        value: value.to_string(),
    };

    if !regex.is_match(value) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())
}

/// Clock plus the offset that defines where days begin
#[derive(Clone)]
pub struct Calendar {
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl Calendar {
    pub fn new(clock: Arc<dyn Clock>, offset: FixedOffset) -> Self {
        Self { clock, offset }
    }

    /// UTC calendar on the system clock
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock), Utc.fix())
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Window of the current day, computed once from the clock
    pub fn today(&self) -> DayWindow {
        DayWindow::containing(self.now(), self.offset)
    }

    pub fn window_for(&self, date: NaiveDate) -> DayWindow {
        DayWindow::for_date(date, self.offset)
    }

    /// Window for an optional `YYYY-MM-DD` string, defaulting to today
    pub fn window_for_param(&self, date: Option<&str>) -> Result<DayWindow, ValidationError> {
        match date {
            Some(value) => parse_date(value).map(|d| self.window_for(d)),
            None => Ok(self.today()),
        }
    }
}

impl fmt::Debug for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Calendar")
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}
