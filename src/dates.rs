//! Calendar date helpers
//!
//! Dates travel through the service as `NaiveDate` and are rendered in the
//! canonical `YYYY-MM-DD` form, which sorts lexicographically in the same
//! order as chronologically. All "today" computations go through a [`Clock`]
//! so that date-boundary logic can be tested against a fixed instant.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};

use crate::{Result, WeatherError};

/// Canonical text format for a calendar date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current UTC calendar date
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Reads the system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Noon UTC on the given date
    #[must_use]
    pub fn on_date(date: NaiveDate) -> Self {
        Self::new(date.and_time(NaiveTime::MIN).and_utc() + chrono::Duration::hours(12))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

/// True iff `s` is exactly `dddd-dd-dd` and names a real calendar date
#[must_use]
pub fn is_valid_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return false;
    }

    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map(|date| format_date(date) == s)
        .unwrap_or(false)
}

/// Parse a canonical date string
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    if !is_valid_date(s) {
        return Err(WeatherError::invalid_input(format!(
            "Invalid date '{s}', expected YYYY-MM-DD"
        )));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| WeatherError::invalid_input(format!("Invalid date '{s}': {e}")))
}

#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Offset a date by `n` days; saturates at the ends of the representable range
#[must_use]
pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    let offset = Days::new(n.unsigned_abs());
    let shifted = if n >= 0 {
        date.checked_add_days(offset)
    } else {
        date.checked_sub_days(offset)
    };
    shifted.unwrap_or(if n >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}

/// Number of calendar days in `[start, end]`. Only meaningful for `start <= end`.
#[must_use]
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Canonical UTC date string for the clock's current instant
#[must_use]
pub fn today(clock: &dyn Clock) -> String {
    format_date(clock.today())
}
