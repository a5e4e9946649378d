// ⚠️ Error Taxonomy
// Every engine failure is typed and carries a human-readable reason

use crate::calendar::CalendarDate;
use crate::timezone::{LocalTimeKind, WallClockFields};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// Reference date precedes the birth date
    #[error("Reference date {reference} must be the same or after the birth date {birth}")]
    InvalidRange {
        birth: CalendarDate,
        reference: CalendarDate,
    },

    /// Unparseable or out-of-range calendar/clock fields
    #[error("Malformed date: {0}")]
    MalformedDate(String),

    /// Zone identifier the offset lookup cannot resolve
    #[error("Unknown time zone: {0}")]
    UnknownZone(String),

    /// Wall-clock reading inside a DST gap or overlap
    #[error("{wall} is {kind} in {zone}")]
    AmbiguousLocalTime {
        wall: WallClockFields,
        zone: String,
        kind: LocalTimeKind,
    },

    /// Calculator input rejected before computing
    #[error("{0}")]
    InvalidInput(String),
}

impl ToolError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ToolError::InvalidInput(message.into())
    }
}

pub type ToolResult<T> = Result<T, ToolError>;
