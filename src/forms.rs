// 📝 Forms - raw input in, structured report out
// Form state is plain immutable data; `submit` is a pure function of it.
// Both the CLI and the TUI go through here.

use crate::age::{compute_age_parts, AgeParts};
use crate::calendar::CalendarDate;
use crate::error::{ToolError, ToolResult};
use crate::settings::Settings;
use crate::timezone::{format_offset, Conversion, OffsetLookup, TimeZoneConverter, WallClockFields, ZoneId};
use serde::Serialize;
use std::fmt;

// ============================================================================
// AGE FORM
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgeForm {
    pub birth: String,
    /// Empty means "today"
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeReport {
    pub birth: CalendarDate,
    pub reference: CalendarDate,
    pub age: AgeParts,
}

impl AgeForm {
    pub fn new(birth: impl Into<String>, reference: impl Into<String>) -> Self {
        AgeForm {
            birth: birth.into(),
            reference: reference.into(),
        }
    }

    pub fn submit(&self, today: CalendarDate) -> ToolResult<AgeReport> {
        if self.birth.trim().is_empty() {
            return Err(ToolError::invalid("Please enter a date of birth."));
        }
        let birth: CalendarDate = self.birth.parse()?;
        let reference = if self.reference.trim().is_empty() {
            today
        } else {
            self.reference.parse()?
        };

        Ok(AgeReport {
            birth,
            reference,
            age: compute_age_parts(birth, reference)?,
        })
    }
}

impl fmt::Display for AgeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (as of {})", self.age, self.reference)
    }
}

// ============================================================================
// TIME ZONE FORM
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeZoneForm {
    pub date: String,
    pub time: String,
    pub from_zone: String,
    pub to_zone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeZoneReport {
    pub input: WallClockFields,
    pub from_zone: ZoneId,
    pub to_zone: ZoneId,
    pub conversion: Conversion,
}

impl TimeZoneForm {
    /// Today at noon, between the configured default zones
    pub fn with_defaults(settings: &Settings, today: CalendarDate) -> Self {
        TimeZoneForm {
            date: today.to_string(),
            time: "12:00".to_string(),
            from_zone: settings.default_from_zone.clone(),
            to_zone: settings.default_to_zone.clone(),
        }
    }

    pub fn submit<L: OffsetLookup>(&self, converter: &TimeZoneConverter<L>) -> ToolResult<TimeZoneReport> {
        if self.date.trim().is_empty() {
            return Err(ToolError::invalid("Please choose a date."));
        }
        if self.time.trim().is_empty() {
            return Err(ToolError::invalid("Please choose a time."));
        }
        if self.from_zone.trim().is_empty() || self.to_zone.trim().is_empty() {
            return Err(ToolError::invalid("Please choose both time zones."));
        }

        let date: CalendarDate = self.date.parse()?;
        let input = WallClockFields::from_date_and_time(date, &self.time)?;
        let from_zone = ZoneId::from(self.from_zone.as_str());
        let to_zone = ZoneId::from(self.to_zone.as_str());
        let conversion = converter.convert(&input, &from_zone, &to_zone)?;

        Ok(TimeZoneReport {
            input,
            from_zone,
            to_zone,
            conversion,
        })
    }
}

impl TimeZoneReport {
    /// `HH:MM` in the target zone
    pub fn time_only(&self) -> String {
        let target = &self.conversion.rendered_in_target;
        format!("{:02}:{:02}", target.hour, target.minute)
    }
}

impl fmt::Display for TimeZoneReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}) = {} {} ({}) [{}]",
            self.input,
            self.from_zone,
            format_offset(self.conversion.source_offset_minutes),
            self.conversion.rendered_in_target,
            self.to_zone,
            format_offset(self.conversion.target_offset_minutes),
            self.conversion.instant_utc
        )
    }
}

// ============================================================================
// OUTCOME
// ============================================================================

/// What a form shows under its fields after the last submit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Outcome {
    #[default]
    Pending,
    Success(String),
    Failure(String),
}

impl Outcome {
    pub fn from_result<T: fmt::Display>(result: ToolResult<T>) -> Self {
        match result {
            Ok(report) => Outcome::Success(report.to_string()),
            Err(err) => Outcome::Failure(err.to_string()),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
