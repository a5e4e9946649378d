// Toolgrid - Core Library
// Everyday calculators behind one CLI/TUI: calendar-aware age difference,
// time-zone conversion, and a handful of small health/money formulas

pub mod error;
pub mod calendar;
pub mod age;          // Date difference engine
pub mod timezone;     // Wall-clock <-> instant conversion
pub mod calculators;  // BMI, body fat, loan, interest, discount, tax, love
pub mod settings;
pub mod forms;        // Form view-state -> engine -> report

#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use error::{ToolError, ToolResult};
pub use calendar::{days_in_month, is_leap_year, CalendarDate};
pub use age::{compute_age_parts, AgeParts, DateDiffEngine};
pub use timezone::{
    Conversion, Instant, LocalResolution, LocalTimeKind, LocalTimePolicy,
    OffsetLookup, OffsetTable, TimeZoneConverter, TzDatabase, WallClockFields,
    ZoneId, ZonedReading,
};
pub use settings::{Settings, COMMON_ZONES};
pub use forms::{AgeForm, AgeReport, Outcome, TimeZoneForm, TimeZoneReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
