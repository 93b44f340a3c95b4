//! Calendar-date arithmetic and the injectable "today" oracle.
//!
//! Every date in the domain is a plain calendar date (`NaiveDate`). There is no
//! time-of-day and no timezone arithmetic beyond reading the local date once;
//! DST transitions cannot shift a count because none of these functions ever
//! look at a clock time.

use chrono::{Local, NaiveDate, TimeDelta};

use crate::error::{DomainError, DomainResult};

/// Date format used by the bulk interchange files and the CLI output (`DD/MM/YYYY`).
pub const BR_DATE_FORMAT: &str = "%d/%m/%Y";

/// ISO calendar date format (`YYYY-MM-DD`).
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Placeholder written for an absent date.
pub const ABSENT: &str = "-";

/// `date + n` calendar days (`n` may be negative).
///
/// Saturates at `NaiveDate::MIN` / `NaiveDate::MAX` instead of overflowing.
pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    TimeDelta::try_days(n)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if n >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}

/// Signed whole-day distance `b - a`.
///
/// Positive when `b` is after `a`. Exact inverse of [`add_days`]:
/// `days_between(d, add_days(d, n)) == n` whenever the result is in range.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    b.signed_duration_since(a).num_days()
}

/// Parse a `DD/MM/YYYY` date. `-` and blank input mean "absent".
pub fn parse_br_date(input: &str) -> DomainResult<Option<NaiveDate>> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed == ABSENT {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, BR_DATE_FORMAT)
        .map(Some)
        .map_err(|e| DomainError::validation(format!("invalid date '{trimmed}': {e}")))
}

/// Format an optional date as `DD/MM/YYYY`, or `-` when absent.
pub fn format_br_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format(BR_DATE_FORMAT).to_string(),
        None => ABSENT.to_string(),
    }
}

/// Parse a `YYYY-MM-DD` date (form/CLI input).
pub fn parse_iso_date(input: &str) -> DomainResult<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
        .map_err(|e| DomainError::validation(format!("invalid date '{trimmed}': {e}")))
}

/// Source of the current calendar date.
///
/// This is the only non-deterministic input of the engine. Production code
/// uses [`SystemClock`]; tests pin a date with [`FixedClock`] or a closure.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Reads the local system date.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always returns the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<F> Clock for F
where
    F: Fn() -> NaiveDate,
{
    fn today(&self) -> NaiveDate {
        self()
    }
}
