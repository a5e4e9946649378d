// 🌍 Time Zone Converter
// Wall-clock reading in one zone -> absolute instant -> wall-clock reading in
// another zone. Offsets come from an injected `OffsetLookup`; this module owns
// no zone rules of its own.

use crate::calendar::CalendarDate;
use crate::error::{ToolError, ToolResult};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Offset, SecondsFormat, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};

const MILLIS_PER_SECOND: i64 = 1_000;
const MILLIS_PER_MINUTE: i64 = 60_000;
const MINUTES_PER_DAY: i32 = 24 * 60;

// ============================================================================
// INSTANT
// ============================================================================

/// Absolute point in time: milliseconds since the Unix epoch.
///
/// The only representation compared across zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instant(pub i64);

impl Instant {
    pub fn from_millis(millis: i64) -> Self {
        Instant(millis)
    }

    pub fn millis(self) -> i64 {
        self.0
    }

    pub fn shifted_minutes(self, minutes: i32) -> Self {
        Instant(self.0.saturating_add(i64::from(minutes) * MILLIS_PER_MINUTE))
    }

    pub fn shifted_seconds(self, seconds: i32) -> Self {
        Instant(self.0.saturating_add(i64::from(seconds) * MILLIS_PER_SECOND))
    }

    pub fn to_utc(self) -> ToolResult<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
            .ok_or_else(|| ToolError::MalformedDate(format!("instant {}ms is out of range", self.0)))
    }

    /// RFC 3339 rendering in UTC, e.g. `2024-01-15T12:00:00.000Z`
    pub fn to_rfc3339(self) -> ToolResult<String> {
        Ok(self.to_utc()?.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_rfc3339() {
            Ok(iso) => f.write_str(&iso),
            Err(_) => write!(f, "{}ms", self.0),
        }
    }
}

// ============================================================================
// WALL CLOCK FIELDS
// ============================================================================

/// A local clock reading. Meaningless without the zone it was read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWallClock")]
pub struct WallClockFields {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

#[derive(Deserialize)]
struct RawWallClock {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    #[serde(default)]
    second: u32,
}

impl TryFrom<RawWallClock> for WallClockFields {
    type Error = ToolError;

    fn try_from(raw: RawWallClock) -> ToolResult<Self> {
        WallClockFields::new(raw.year, raw.month, raw.day, raw.hour, raw.minute, raw.second)
    }
}

impl WallClockFields {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> ToolResult<Self> {
        let fields = WallClockFields {
            year,
            month,
            day,
            hour,
            minute,
            second,
        };
        fields.to_naive()?;
        Ok(fields)
    }

    /// Combines a calendar date with an `HH:MM` or `HH:MM:SS` time string
    pub fn from_date_and_time(date: CalendarDate, time: &str) -> ToolResult<Self> {
        let (hour, minute, second) = parse_time_of_day(time)?;
        WallClockFields::new(date.year, date.month, date.day, hour, minute, second)
    }

    pub fn from_naive(naive: NaiveDateTime) -> Self {
        WallClockFields {
            year: naive.year(),
            month: naive.month(),
            day: naive.day(),
            hour: naive.hour(),
            minute: naive.minute(),
            second: naive.second(),
        }
    }

    pub fn to_naive(&self) -> ToolResult<NaiveDateTime> {
        let date = NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or_else(|| {
            ToolError::MalformedDate(format!(
                "{:04}-{:02}-{:02} is not a calendar date",
                self.year, self.month, self.day
            ))
        })?;
        date.and_hms_opt(self.hour, self.minute, self.second).ok_or_else(|| {
            ToolError::MalformedDate(format!(
                "{:02}:{:02}:{:02} is not a time of day",
                self.hour, self.minute, self.second
            ))
        })
    }

    pub fn date(&self) -> CalendarDate {
        CalendarDate {
            year: self.year,
            month: self.month,
            day: self.day,
        }
    }

    /// The instant these fields would denote if they were read in UTC
    pub fn as_if_utc(&self) -> ToolResult<Instant> {
        Ok(Instant(self.to_naive()?.and_utc().timestamp_millis()))
    }

    /// Fields of `instant` as seen on a clock running `offset_seconds` ahead of UTC
    pub fn at_offset_seconds(instant: Instant, offset_seconds: i32) -> ToolResult<Self> {
        let local = instant.shifted_seconds(offset_seconds).to_utc()?;
        Ok(WallClockFields::from_naive(local.naive_utc()))
    }
}

impl fmt::Display for WallClockFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Parses `HH:MM` or `HH:MM:SS`
pub fn parse_time_of_day(time: &str) -> ToolResult<(u32, u32, u32)> {
    let trimmed = time.trim();
    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(ToolError::MalformedDate(format!(
            "'{}' is not an HH:MM time",
            trimmed
        )));
    }

    let mut values = [0u32; 3];
    for (slot, part) in values.iter_mut().zip(&parts) {
        if part.is_empty() || part.len() > 2 || !part.chars().all(|c| c.is_ascii_digit()) {
            return Err(ToolError::MalformedDate(format!(
                "'{}' is not an HH:MM time",
                trimmed
            )));
        }
        *slot = part
            .parse()
            .map_err(|_| ToolError::MalformedDate(format!("'{}' is not an HH:MM time", trimmed)))?;
    }

    let [hour, minute, second] = values;
    if hour > 23 || minute > 59 || second > 59 {
        return Err(ToolError::MalformedDate(format!(
            "'{}' is outside 00:00:00-23:59:59",
            trimmed
        )));
    }
    Ok((hour, minute, second))
}

/// `+05:30` style rendering of an offset in minutes
pub fn format_offset(offset_minutes: i32) -> String {
    let sign = if offset_minutes < 0 { '-' } else { '+' };
    let abs = offset_minutes.unsigned_abs();
    format!("{}{:02}:{:02}", sign, abs / 60, abs % 60)
}

// ============================================================================
// ZONE ID + OFFSET LOOKUP
// ============================================================================

/// Opaque zone identifier, resolved only by an `OffsetLookup`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(String);

impl ZoneId {
    pub fn new(name: impl Into<String>) -> Self {
        ZoneId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ZoneId {
    fn from(name: &str) -> Self {
        ZoneId::new(name.trim())
    }
}

impl From<String> for ZoneId {
    fn from(name: String) -> Self {
        ZoneId::new(name.trim())
    }
}

/// Offset-from-UTC capability keyed by (instant, zone).
///
/// `local = utc + offset`, so New York in winter is `-300`.
///
/// Offsets are whole minutes, floored. Lookups that know second-level
/// offsets (local mean time before standard zones) also provide
/// `offset_seconds`, which rendering uses.
pub trait OffsetLookup {
    fn offset_minutes(&self, instant: Instant, zone: &ZoneId) -> ToolResult<i32>;

    fn offset_seconds(&self, instant: Instant, zone: &ZoneId) -> ToolResult<i32> {
        Ok(self.offset_minutes(instant, zone)? * 60)
    }

    /// Fails with `UnknownZone` when the zone cannot be resolved
    fn resolve(&self, zone: &ZoneId) -> ToolResult<()> {
        self.offset_minutes(Instant(0), zone).map(|_| ())
    }
}

impl<T: OffsetLookup + ?Sized> OffsetLookup for &T {
    fn offset_minutes(&self, instant: Instant, zone: &ZoneId) -> ToolResult<i32> {
        (**self).offset_minutes(instant, zone)
    }

    fn offset_seconds(&self, instant: Instant, zone: &ZoneId) -> ToolResult<i32> {
        (**self).offset_seconds(instant, zone)
    }
}

/// Host timezone database: the IANA data bundled by `chrono-tz`
#[derive(Debug, Clone, Copy, Default)]
pub struct TzDatabase;

impl TzDatabase {
    pub fn new() -> Self {
        TzDatabase
    }

    fn zone(&self, zone: &ZoneId) -> ToolResult<Tz> {
        zone.as_str()
            .parse::<Tz>()
            .map_err(|_| ToolError::UnknownZone(zone.to_string()))
    }

    /// Every zone name the database knows
    pub fn zone_names() -> impl Iterator<Item = &'static str> {
        chrono_tz::TZ_VARIANTS.iter().map(|tz| tz.name())
    }
}

impl OffsetLookup for TzDatabase {
    fn offset_minutes(&self, instant: Instant, zone: &ZoneId) -> ToolResult<i32> {
        Ok(self.offset_seconds(instant, zone)?.div_euclid(60))
    }

    fn offset_seconds(&self, instant: Instant, zone: &ZoneId) -> ToolResult<i32> {
        let tz = self.zone(zone)?;
        let utc = instant.to_utc()?;
        Ok(tz
            .offset_from_utc_datetime(&utc.naive_utc())
            .fix()
            .local_minus_utc())
    }
}

#[derive(Debug, Clone)]
struct ZoneRule {
    base_offset: i32,
    // sorted by instant; each entry applies from its instant onward
    transitions: Vec<(Instant, i32)>,
}

/// In-memory offset rules: fixed zones and explicit transition lists.
///
/// Deterministic stand-in for the host database in tests and embeddings.
#[derive(Debug, Clone, Default)]
pub struct OffsetTable {
    zones: HashMap<String, ZoneRule>,
}

impl OffsetTable {
    pub fn new() -> Self {
        OffsetTable {
            zones: HashMap::new(),
        }
    }

    pub fn with_fixed(self, zone: &str, offset_minutes: i32) -> Self {
        self.with_transitions(zone, offset_minutes, Vec::new())
    }

    pub fn with_transitions(
        mut self,
        zone: &str,
        base_offset: i32,
        transitions: impl IntoIterator<Item = (Instant, i32)>,
    ) -> Self {
        let mut transitions: Vec<(Instant, i32)> = transitions.into_iter().collect();
        transitions.sort_by_key(|(at, _)| *at);
        self.zones.insert(
            zone.to_string(),
            ZoneRule {
                base_offset,
                transitions,
            },
        );
        self
    }
}

impl OffsetLookup for OffsetTable {
    fn offset_minutes(&self, instant: Instant, zone: &ZoneId) -> ToolResult<i32> {
        let rule = self
            .zones
            .get(zone.as_str())
            .ok_or_else(|| ToolError::UnknownZone(zone.to_string()))?;
        let applied = rule.transitions.partition_point(|(at, _)| *at <= instant);
        Ok(match applied {
            0 => rule.base_offset,
            n => rule.transitions[n - 1].1,
        })
    }
}

// ============================================================================
// LOCAL TIME RESOLUTION
// ============================================================================

/// How a wall-clock reading maps onto instants in its zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalTimeKind {
    /// Exactly one instant
    Unique,
    /// No instant (spring-forward)
    Gap,
    /// Two instants (fall-back)
    Overlap,
}

impl fmt::Display for LocalTimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LocalTimeKind::Unique => "unambiguous",
            LocalTimeKind::Gap => "skipped by a DST gap",
            LocalTimeKind::Overlap => "repeated by a DST overlap",
        })
    }
}

/// What to do with a reading that falls in a gap or overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalTimePolicy {
    /// Fail with `AmbiguousLocalTime`
    #[default]
    Reject,
    /// Use the smaller of the surrounding offsets (standard time for zones
    /// whose DST offset is the larger one)
    PreferStandard,
    /// Single offset correction at the as-if-UTC candidate, no detection
    OneStep,
}

impl LocalTimePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocalTimePolicy::Reject => "reject",
            LocalTimePolicy::PreferStandard => "prefer_standard",
            LocalTimePolicy::OneStep => "one_step",
        }
    }
}

impl fmt::Display for LocalTimePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocalTimePolicy {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "reject" => Ok(LocalTimePolicy::Reject),
            "prefer_standard" => Ok(LocalTimePolicy::PreferStandard),
            "one_step" => Ok(LocalTimePolicy::OneStep),
            other => Err(ToolError::invalid(format!(
                "unknown local time policy '{}' (expected reject, prefer_standard or one_step)",
                other
            ))),
        }
    }
}

/// A wall-clock reading pinned to an instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocalResolution {
    pub instant: Instant,
    pub offset_minutes: i32,
    pub kind: LocalTimeKind,
}

/// A zone's reading of an instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZonedReading {
    pub fields: WallClockFields,
    pub offset_minutes: i32,
}

/// Result of `TimeZoneConverter::convert`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversion {
    pub instant: Instant,
    pub instant_utc: String,
    pub source_offset_minutes: i32,
    pub target_offset_minutes: i32,
    pub local_time_kind: LocalTimeKind,
    pub rendered_in_target: WallClockFields,
}

// ============================================================================
// CONVERTER
// ============================================================================

pub struct TimeZoneConverter<L = TzDatabase> {
    lookup: L,
    policy: LocalTimePolicy,
}

impl Default for TimeZoneConverter<TzDatabase> {
    fn default() -> Self {
        TimeZoneConverter::new(TzDatabase)
    }
}

impl<L: OffsetLookup> TimeZoneConverter<L> {
    pub fn new(lookup: L) -> Self {
        TimeZoneConverter {
            lookup,
            policy: LocalTimePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: LocalTimePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> LocalTimePolicy {
        self.policy
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Pins a wall-clock reading in `zone` to an instant.
    ///
    /// The reading is first taken as UTC, the zone's offset at that candidate
    /// corrects it in one step. Offsets a day either side of the candidate
    /// are then checked: each offset `o` with `offset(candidate - o) == o` is
    /// a valid reading. None valid is a gap, two is an overlap.
    pub fn resolve_local(&self, wall: &WallClockFields, zone: &ZoneId) -> ToolResult<LocalResolution> {
        let candidate = wall.as_if_utc()?;
        let one_step_offset = self.lookup.offset_minutes(candidate, zone)?;
        let one_step = self.pin(candidate, one_step_offset, zone)?;

        let before = self
            .lookup
            .offset_minutes(candidate.shifted_minutes(-MINUTES_PER_DAY), zone)?;
        let after = self
            .lookup
            .offset_minutes(candidate.shifted_minutes(MINUTES_PER_DAY), zone)?;

        let mut offsets = vec![before, one_step_offset, after];
        offsets.sort_unstable();
        offsets.dedup();

        let mut valid = Vec::with_capacity(offsets.len());
        for offset in offsets {
            if self.lookup.offset_minutes(candidate.shifted_minutes(-offset), zone)? == offset {
                valid.push(offset);
            }
        }

        let kind = match valid.len() {
            0 => LocalTimeKind::Gap,
            1 => LocalTimeKind::Unique,
            _ => LocalTimeKind::Overlap,
        };
        debug!(
            %zone,
            one_step_offset,
            before,
            after,
            ?valid,
            ?kind,
            "classified local time"
        );

        match (kind, self.policy) {
            (LocalTimeKind::Unique, _) => Ok(LocalResolution {
                instant: self.pin(candidate, valid[0], zone)?,
                offset_minutes: valid[0],
                kind,
            }),
            (_, LocalTimePolicy::OneStep) => Ok(LocalResolution {
                instant: one_step,
                offset_minutes: one_step_offset,
                kind,
            }),
            (_, LocalTimePolicy::Reject) => Err(ToolError::AmbiguousLocalTime {
                wall: *wall,
                zone: zone.to_string(),
                kind,
            }),
            (_, LocalTimePolicy::PreferStandard) => {
                let instant = self.pin(candidate, before.min(after), zone)?;
                Ok(LocalResolution {
                    instant,
                    offset_minutes: self.lookup.offset_minutes(instant, zone)?,
                    kind,
                })
            }
        }
    }

    /// Applies the whole-minute offset to the candidate, then restores the
    /// leftover seconds when the lookup reports them for that same offset
    fn pin(&self, candidate: Instant, offset_minutes: i32, zone: &ZoneId) -> ToolResult<Instant> {
        let approx = candidate.shifted_minutes(-offset_minutes);
        let seconds = self.lookup.offset_seconds(approx, zone)?;
        if seconds.div_euclid(60) == offset_minutes {
            Ok(candidate.shifted_seconds(-seconds))
        } else {
            Ok(approx)
        }
    }

    /// Reads `instant` on `zone`'s clock
    pub fn wall_clock_at(&self, instant: Instant, zone: &ZoneId) -> ToolResult<ZonedReading> {
        let offset_seconds = self.lookup.offset_seconds(instant, zone)?;
        Ok(ZonedReading {
            fields: WallClockFields::at_offset_seconds(instant, offset_seconds)?,
            offset_minutes: offset_seconds.div_euclid(60),
        })
    }

    #[instrument(level = "debug", skip(self))]
    pub fn convert(&self, wall: &WallClockFields, from: &ZoneId, to: &ZoneId) -> ToolResult<Conversion> {
        self.lookup.resolve(to)?;
        let resolved = self.resolve_local(wall, from)?;
        let target = self.wall_clock_at(resolved.instant, to)?;

        Ok(Conversion {
            instant: resolved.instant,
            instant_utc: resolved.instant.to_rfc3339()?,
            source_offset_minutes: resolved.offset_minutes,
            target_offset_minutes: target.offset_minutes,
            local_time_kind: resolved.kind,
            rendered_in_target: target.fields,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
