// 🎂 Date Difference Engine
// Elapsed years/months/days between two calendar dates using calendar
// borrowing, never millisecond division.

use crate::calendar::{days_in_month, CalendarDate};
use crate::error::{ToolError, ToolResult};
use serde::Serialize;
use std::fmt;
use tracing::debug;

// ============================================================================
// AGE PARTS
// ============================================================================

/// Result of a date difference.
///
/// `months` is always in 0..=11 and `days` in 0..=30.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeParts {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl AgeParts {
    pub const ZERO: AgeParts = AgeParts {
        years: 0,
        months: 0,
        days: 0,
    };

    /// Adds these parts back onto `birth`: all months in one step (clamped to
    /// month end), then the days.
    pub fn add_to(&self, birth: CalendarDate) -> ToolResult<CalendarDate> {
        birth
            .add_months(self.years * 12 + self.months)?
            .add_days(u64::from(self.days))
    }
}

impl fmt::Display for AgeParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} year{}, {} month{}, {} day{}",
            self.years,
            plural(self.years),
            self.months,
            plural(self.months),
            self.days,
            plural(self.days)
        )
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Computes the elapsed years, months and days from `birth` to `reference`.
///
/// A negative day difference borrows the length of the month *before*
/// `reference`'s month. The birth day is clamped to that length first, so
/// Jan 31 -> Mar 1 is one month and one day rather than a negative day count.
pub fn compute_age_parts(birth: CalendarDate, reference: CalendarDate) -> ToolResult<AgeParts> {
    if reference < birth {
        return Err(ToolError::InvalidRange { birth, reference });
    }

    let mut years = reference.year - birth.year;
    let mut months = reference.month as i32 - birth.month as i32;
    let mut days = reference.day as i32 - birth.day as i32;

    if days < 0 {
        let (prev_year, prev_month) = reference.previous_month();
        let borrowed = days_in_month(prev_year, prev_month);
        let anchor_day = birth.day.min(borrowed);
        days = reference.day as i32 + borrowed as i32 - anchor_day as i32;
        months -= 1;
        debug!(
            borrowed,
            prev_year, prev_month, anchor_day, "borrowed days from previous month"
        );
    }

    if months < 0 {
        months += 12;
        years -= 1;
    }

    // reference >= birth guarantees these are non-negative
    Ok(AgeParts {
        years: years as u32,
        months: months as u32,
        days: days as u32,
    })
}

/// Struct form of the engine for callers that hold it behind a seam
#[derive(Debug, Clone, Copy, Default)]
pub struct DateDiffEngine;

impl DateDiffEngine {
    pub fn new() -> Self {
        DateDiffEngine
    }

    pub fn compute(&self, birth: CalendarDate, reference: CalendarDate) -> ToolResult<AgeParts> {
        compute_age_parts(birth, reference)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::new(y, m, d).unwrap()
    }

    fn parts(years: u32, months: u32, days: u32) -> AgeParts {
        AgeParts {
            years,
            months,
            days,
        }
    }

    #[test]
    fn test_identity() {
        for d in [date(2000, 2, 29), date(2024, 1, 1), date(1999, 12, 31)] {
            assert_eq!(compute_age_parts(d, d).unwrap(), AgeParts::ZERO);
        }
    }

    #[test]
    fn test_leap_day_to_next_february() {
        let result = compute_age_parts(date(2000, 2, 29), date(2001, 2, 28)).unwrap();
        assert_eq!(result, parts(0, 11, 30));
    }

    #[test]
    fn test_borrow_uses_month_before_reference() {
        // February 2024 has 29 days; January's 31 would give 26
        let leap = compute_age_parts(date(2024, 1, 15), date(2024, 3, 10)).unwrap();
        assert_eq!(leap, parts(0, 1, 24));

        let common = compute_age_parts(date(2023, 1, 15), date(2023, 3, 10)).unwrap();
        assert_eq!(common, parts(0, 1, 23));
    }

    #[test]
    fn test_month_end_birth_day_is_clamped() {
        let result = compute_age_parts(date(2024, 1, 31), date(2024, 3, 1)).unwrap();
        assert_eq!(result, parts(0, 1, 1));
        assert_eq!(result.add_to(date(2024, 1, 31)).unwrap(), date(2024, 3, 1));
    }

    #[test]
    fn test_borrow_across_year_boundary() {
        let result = compute_age_parts(date(2023, 12, 20), date(2024, 1, 5)).unwrap();
        assert_eq!(result, parts(0, 0, 16));
    }

    #[test]
    fn test_whole_years() {
        let result = compute_age_parts(date(1990, 6, 15), date(2024, 6, 15)).unwrap();
        assert_eq!(result, parts(34, 0, 0));
    }

    #[test]
    fn test_reference_before_birth_fails() {
        let err = compute_age_parts(date(2024, 1, 1), date(2023, 1, 1)).unwrap_err();
        assert!(matches!(err, ToolError::InvalidRange { .. }));
    }

    #[test]
    fn test_reconstruction_round_trip() {
        let start = date(1999, 11, 1).to_naive().unwrap();
        let mut checked = 0;
        for birth_offset in (0..900u64).step_by(3) {
            let birth = CalendarDate::from_naive(start + chrono::Days::new(birth_offset));
            for gap in (0..800u64).step_by(7) {
                let reference = birth.add_days(gap).unwrap();
                let result = compute_age_parts(birth, reference).unwrap();

                assert!(result.months <= 11, "{} -> {}: {:?}", birth, reference, result);
                assert!(result.days <= 30, "{} -> {}: {:?}", birth, reference, result);
                assert_eq!(
                    result.add_to(birth).unwrap(),
                    reference,
                    "{} + {:?}",
                    birth,
                    result
                );
                checked += 1;
            }
        }
        assert!(checked > 30_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(parts(1, 1, 1).to_string(), "1 year, 1 month, 1 day");
        assert_eq!(parts(0, 11, 30).to_string(), "0 years, 11 months, 30 days");
    }

    #[test]
    fn test_engine_struct_delegates() {
        let engine = DateDiffEngine::new();
        assert_eq!(
            engine.compute(date(2020, 5, 5), date(2021, 6, 6)).unwrap(),
            parts(1, 1, 1)
        );
    }
}
