//! Date windows used by queries and summaries.
//!
//! A [`DateRange`] is inclusive on both ends (`[start, end]`), which matches
//! how entries are dated: one calendar day, no time of day.

use std::fmt;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Longest range a query may ask for: five years, leap days included.
pub const MAX_RANGE_DAYS: i64 = 5 * 365 + 2;

/// Allowed values for the bank-statement anchor day.
pub const STATEMENT_DAY_MIN: u32 = 1;
pub const STATEMENT_DAY_MAX: u32 = 28;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `start > end` and spans above [`MAX_RANGE_DAYS`].
    pub fn new(start: NaiveDate, end: NaiveDate) -> ResultEngine<Self> {
        let range = Self { start, end };
        range.check()?;
        Ok(range)
    }

    /// Single-day range.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Validate a range that was built field by field.
    pub fn check(&self) -> ResultEngine<()> {
        if self.start > self.end {
            return Err(EngineError::validation(
                "DateRange.Invalid",
                "start date must be on or before end date",
            )
            .with_metadata("start", self.start)
            .with_metadata("end", self.end));
        }
        if self.days() > MAX_RANGE_DAYS {
            return Err(EngineError::validation(
                "DateRange.TooLong",
                format!("date range must not exceed {MAX_RANGE_DAYS} days"),
            )
            .with_metadata("days", self.days()));
        }
        Ok(())
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// `YYYY-MM-DD:YYYY-MM-DD`, the form used inside cache keys.
    pub fn key(&self) -> String {
        format!("{}:{}", self.start, self.end)
    }

    /// Monday of every week overlapping the range, in order.
    pub fn week_starts(&self) -> Vec<NaiveDate> {
        let mut out = Vec::new();
        let mut cursor = week_start(self.start);
        while cursor <= self.end {
            out.push(cursor);
            match cursor.checked_add_days(Days::new(7)) {
                Some(next) => cursor = next,
                None => break,
            }
        }
        out
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.week(Weekday::Mon).first_day()
}

/// Clamp a configured anchor day into the supported window.
pub fn clamp_statement_day(day: u32) -> u32 {
    day.clamp(STATEMENT_DAY_MIN, STATEMENT_DAY_MAX)
}

/// Bank-statement period containing `date` for the given anchor day.
///
/// The period starts on the latest anchor day on or before `date` and ends the
/// day before the following anchor.
pub fn statement_period(date: NaiveDate, anchor_day: u32) -> ResultEngine<DateRange> {
    let anchor_day = clamp_statement_day(anchor_day);
    let overflow = || EngineError::system("Period.Overflow", "statement period out of range");

    let this_month = date.with_day(anchor_day).ok_or_else(overflow)?;
    let start = if date.day() >= anchor_day {
        this_month
    } else {
        this_month
            .checked_sub_months(Months::new(1))
            .ok_or_else(overflow)?
    };
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.checked_sub_days(Days::new(1)))
        .ok_or_else(overflow)?;

    Ok(DateRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn range_rejects_reversed_dates() {
        let err = DateRange::new(d(2024, 2, 1), d(2024, 1, 1)).unwrap_err();
        assert_eq!(err.code, "DateRange.Invalid");
        assert!(DateRange::new(d(2024, 1, 1), d(2024, 1, 1)).is_ok());
    }

    #[test]
    fn range_rejects_more_than_five_years() {
        assert!(DateRange::new(d(2020, 1, 1), d(2024, 12, 31)).is_ok());
        let err = DateRange::new(d(2018, 1, 1), d(2024, 1, 1)).unwrap_err();
        assert_eq!(err.code, "DateRange.TooLong");
    }

    #[test]
    fn statement_period_on_and_before_anchor() {
        let p = statement_period(d(2024, 3, 20), 15).unwrap();
        assert_eq!(p, DateRange { start: d(2024, 3, 15), end: d(2024, 4, 14) });

        let p = statement_period(d(2024, 3, 10), 15).unwrap();
        assert_eq!(p, DateRange { start: d(2024, 2, 15), end: d(2024, 3, 14) });

        let p = statement_period(d(2024, 3, 15), 15).unwrap();
        assert_eq!(p.start, d(2024, 3, 15));
    }

    #[test]
    fn statement_period_anchor_one_is_calendar_month() {
        let p = statement_period(d(2024, 2, 29), 1).unwrap();
        assert_eq!(p, DateRange { start: d(2024, 2, 1), end: d(2024, 2, 29) });
    }

    #[test]
    fn statement_period_crosses_year_boundary() {
        let p = statement_period(d(2025, 1, 3), 25).unwrap();
        assert_eq!(p, DateRange { start: d(2024, 12, 25), end: d(2025, 1, 24) });
    }

    #[test]
    fn anchor_day_is_clamped() {
        let p = statement_period(d(2024, 3, 30), 31).unwrap();
        assert_eq!(p.start, d(2024, 3, 28));
        assert_eq!(clamp_statement_day(0), 1);
    }

    #[test]
    fn week_starts_cover_range() {
        // 2024-01-03 is a Wednesday.
        let range = DateRange::new(d(2024, 1, 3), d(2024, 1, 15)).unwrap();
        assert_eq!(
            range.week_starts(),
            vec![d(2024, 1, 1), d(2024, 1, 8), d(2024, 1, 15)]
        );
    }
}
