// 📅 Calendar Dates
// Pure (year, month, day) values with no time-of-day and no zone attached

use crate::error::{ToolError, ToolResult};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CALENDAR RULES
// ============================================================================

/// Gregorian leap-year rule
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`; 0 for an invalid month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

// ============================================================================
// CALENDAR DATE
// ============================================================================

/// A date stripped of time-of-day and zone.
///
/// Field order matters: the derived `Ord` compares (year, month, day)
/// lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCalendarDate")]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

// Deserialized fields go through `CalendarDate::new`
#[derive(Deserialize)]
struct RawCalendarDate {
    year: i32,
    month: u32,
    day: u32,
}

impl TryFrom<RawCalendarDate> for CalendarDate {
    type Error = ToolError;

    fn try_from(raw: RawCalendarDate) -> ToolResult<Self> {
        CalendarDate::new(raw.year, raw.month, raw.day)
    }
}

impl CalendarDate {
    /// Validated constructor
    pub fn new(year: i32, month: u32, day: u32) -> ToolResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(ToolError::MalformedDate(format!(
                "month {} is outside 1-12",
                month
            )));
        }
        let max_day = days_in_month(year, month);
        if day == 0 || day > max_day {
            return Err(ToolError::MalformedDate(format!(
                "day {} is outside 1-{} for {:04}-{:02}",
                day, max_day, year, month
            )));
        }
        // chrono's supported range is narrower than i32
        if NaiveDate::from_ymd_opt(year, month, day).is_none() {
            return Err(ToolError::MalformedDate(format!(
                "year {} is out of range",
                year
            )));
        }
        Ok(CalendarDate { year, month, day })
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        CalendarDate {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn to_naive(&self) -> ToolResult<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .ok_or_else(|| ToolError::MalformedDate(self.to_string()))
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    /// (year, month) of the month immediately before this date's month
    pub fn previous_month(&self) -> (i32, u32) {
        if self.month == 1 {
            (self.year - 1, 12)
        } else {
            (self.year, self.month - 1)
        }
    }

    /// Adds whole months, clamping the day to the end of the target month
    /// (Jan 31 + 1 month = Feb 28/29).
    pub fn add_months(&self, months: u32) -> ToolResult<Self> {
        self.to_naive()?
            .checked_add_months(Months::new(months))
            .map(Self::from_naive)
            .ok_or_else(|| ToolError::MalformedDate(format!("{} + {} months", self, months)))
    }

    pub fn add_days(&self, days: u64) -> ToolResult<Self> {
        self.to_naive()?
            .checked_add_days(Days::new(days))
            .map(Self::from_naive)
            .ok_or_else(|| ToolError::MalformedDate(format!("{} + {} days", self, days)))
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time-of-day after `T` or
/// a space. The time part is discarded.
impl FromStr for CalendarDate {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let date_part = trimmed
            .split(|c: char| c == 'T' || c == ' ')
            .next()
            .unwrap_or_default();

        let fields: Vec<&str> = date_part.split('-').collect();
        if fields.len() != 3 || fields.iter().any(|f| f.is_empty()) {
            return Err(ToolError::MalformedDate(format!(
                "'{}' is not a YYYY-MM-DD date",
                trimmed
            )));
        }

        let parse = |value: &str, what: &str| -> ToolResult<i64> {
            if !value.chars().all(|c| c.is_ascii_digit()) {
                return Err(ToolError::MalformedDate(format!(
                    "{} '{}' in '{}' is not a number",
                    what, value, trimmed
                )));
            }
            value.parse::<i64>().map_err(|_| {
                ToolError::MalformedDate(format!("{} '{}' in '{}' is out of range", what, value, trimmed))
            })
        };

        let year = parse(fields[0], "year")?;
        let month = parse(fields[1], "month")?;
        let day = parse(fields[2], "day")?;

        let year = i32::try_from(year)
            .map_err(|_| ToolError::MalformedDate(format!("year {} is out of range", year)))?;
        let month = u32::try_from(month)
            .map_err(|_| ToolError::MalformedDate(format!("month {} is outside 1-12", month)))?;
        let day = u32::try_from(day)
            .map_err(|_| ToolError::MalformedDate(format!("day {} is out of range", day)))?;

        CalendarDate::new(year, month, day)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_validates_fields() {
        let date: CalendarDate = serde_json::from_str(r#"{"year":2024,"month":2,"day":29}"#).unwrap();
        assert_eq!(date, CalendarDate::new(2024, 2, 29).unwrap());

        assert!(serde_json::from_str::<CalendarDate>(r#"{"year":2023,"month":2,"day":30}"#).is_err());
        assert!(serde_json::from_str::<CalendarDate>(r#"{"year":2023,"month":13,"day":1}"#).is_err());
    }

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(2000));
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2023));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2023, 4), 30);
        assert_eq!(days_in_month(2023, 12), 31);
        assert_eq!(days_in_month(2023, 13), 0);
    }

    #[test]
    fn test_new_rejects_out_of_range_fields() {
        assert!(CalendarDate::new(2023, 2, 29).is_err());
        assert!(CalendarDate::new(2023, 0, 1).is_err());
        assert!(CalendarDate::new(2023, 13, 1).is_err());
        assert!(CalendarDate::new(2023, 4, 31).is_err());
        assert!(CalendarDate::new(2024, 2, 29).is_ok());
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let a = CalendarDate::new(2023, 12, 31).unwrap();
        let b = CalendarDate::new(2024, 1, 1).unwrap();
        let c = CalendarDate::new(2024, 1, 2).unwrap();
        assert!(a < b);
        assert!(b < c);
        assert_eq!(b, CalendarDate::new(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_parse_strips_time_of_day() {
        let expected = CalendarDate::new(2024, 3, 5).unwrap();
        assert_eq!("2024-03-05".parse::<CalendarDate>().unwrap(), expected);
        assert_eq!("2024-03-05T23:59:59".parse::<CalendarDate>().unwrap(), expected);
        assert_eq!(" 2024-03-05 08:00 ".parse::<CalendarDate>().unwrap(), expected);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "2024-03", "2024/03/05", "2024-ab-05", "2023-02-29", "-2024-01-01"] {
            let err = input.parse::<CalendarDate>().unwrap_err();
            assert!(matches!(err, ToolError::MalformedDate(_)), "input {:?}", input);
        }
    }

    #[test]
    fn test_previous_month_wraps_year() {
        let jan = CalendarDate::new(2024, 1, 15).unwrap();
        assert_eq!(jan.previous_month(), (2023, 12));
        let mar = CalendarDate::new(2024, 3, 1).unwrap();
        assert_eq!(mar.previous_month(), (2024, 2));
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        let jan31 = CalendarDate::new(2024, 1, 31).unwrap();
        assert_eq!(jan31.add_months(1).unwrap(), CalendarDate::new(2024, 2, 29).unwrap());
        assert_eq!(jan31.add_months(13).unwrap(), CalendarDate::new(2025, 2, 28).unwrap());
        assert_eq!(jan31.add_days(30).unwrap(), CalendarDate::new(2024, 3, 1).unwrap());
    }
}
