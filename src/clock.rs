//! Injectable source of the current date.
//!
//! The expiry rule and the placeholder token both read "now". Going through
//! [`Clock`] keeps them deterministic under test.
//!
//! # Example
//!
//! ```
//! use payment_form::clock::{Clock, FixedClock, YearMonth};
//!
//! let clock = FixedClock::new(2025, 3).unwrap();
//! assert_eq!(clock.year_month(), YearMonth::new(25, 3).unwrap());
//! ```

use chrono::{Datelike, Local, NaiveDate, Utc};
use std::fmt;

/// A month in a two-digit year, as printed on a card.
///
/// Ordering compares the year first, then the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: u8,
    month: u8,
}

impl YearMonth {
    /// Creates a year/month pair.
    ///
    /// Returns `None` if the year is above 99 or the month is not 1-12.
    pub fn new(year: u8, month: u8) -> Option<Self> {
        if year > 99 || !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { year, month })
    }

    /// Takes the two-digit year and 1-indexed month of a calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year().rem_euclid(100) as u8,
            month: date.month() as u8,
        }
    }

    /// Two-digit year (0-99).
    #[inline]
    pub const fn year(&self) -> u8 {
        self.year
    }

    /// Month (1-12).
    #[inline]
    pub const fn month(&self) -> u8 {
        self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.month, self.year)
    }
}

/// Source of the current date and time.
pub trait Clock: Send + Sync {
    /// Today's date in the user's calendar.
    fn today(&self) -> NaiveDate;

    /// Milliseconds since the Unix epoch.
    fn timestamp_millis(&self) -> i64;

    /// The current two-digit year and month.
    fn year_month(&self) -> YearMonth {
        YearMonth::from_date(self.today())
    }
}

/// Reads the system clock. Dates use the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn timestamp_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    today: NaiveDate,
    millis: i64,
}

impl FixedClock {
    /// Fixes the clock at the first day of `year`/`month` (four-digit year).
    ///
    /// Returns `None` for an invalid month.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        let today = NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Self::at(today))
    }

    /// Fixes the clock at midnight UTC of `today`.
    pub fn at(today: NaiveDate) -> Self {
        let millis = today
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .unwrap_or_default();
        Self { today, millis }
    }

    /// Overrides the timestamp reported by [`Clock::timestamp_millis`].
    pub fn with_millis(mut self, millis: i64) -> Self {
        self.millis = millis;
        self
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn timestamp_millis(&self) -> i64 {
        self.millis
    }
}
