//! Timestamp inputs and their conversion to UTC instants.
//!
//! Every grain check reads UTC calendar fields, so parsing is the only place
//! where offsets matter: an offset is applied to find the absolute instant
//! and then forgotten.
//!
//! Accepted textual forms:
//!
//! - `YYYY-MM-DD` (UTC midnight)
//! - `YYYY-MM-DDTHH:mm`, `YYYY-MM-DDTHH:mm:ss`, `YYYY-MM-DDTHH:mm:ss.sss` (UTC)
//! - any date-time form above followed by `Z`, `±HH:MM` or `±HHMM`
//! - RFC 3339
//!
//! A single space may stand in for the `T` separator in every date-time form.
//! A bare hour offset such as `+01` is rejected, and so is a leap second
//! (`23:59:60`).

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SubsecRound, Timelike, Utc};

use crate::error::{GrainError, Result};

/// An absolute point in time, normalized to UTC at millisecond resolution.
pub type Instant = DateTime<Utc>;

/// Anything [`detect_grain`](crate::detect_grain) accepts as a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampLike<'a> {
    /// A textual timestamp, parsed on use.
    Text(&'a str),
    /// An already-parsed instant, truncated to milliseconds on use.
    Instant(Instant),
    /// Milliseconds since the Unix epoch.
    EpochMillis(i64),
}

impl<'a> From<&'a str> for TimestampLike<'a> {
    fn from(s: &'a str) -> Self {
        TimestampLike::Text(s)
    }
}

impl<'a> From<&'a String> for TimestampLike<'a> {
    fn from(s: &'a String) -> Self {
        TimestampLike::Text(s.as_str())
    }
}

impl From<DateTime<Utc>> for TimestampLike<'_> {
    fn from(dt: DateTime<Utc>) -> Self {
        TimestampLike::Instant(dt)
    }
}

impl From<DateTime<FixedOffset>> for TimestampLike<'_> {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        TimestampLike::Instant(dt.with_timezone(&Utc))
    }
}

impl From<i64> for TimestampLike<'_> {
    fn from(millis: i64) -> Self {
        TimestampLike::EpochMillis(millis)
    }
}

impl TimestampLike<'_> {
    /// Resolve this input to an [`Instant`].
    ///
    /// # Errors
    ///
    /// Returns [`GrainError::InvalidDate`] carrying the original input when
    /// text cannot be parsed, an instant falls on a leap second, or epoch
    /// milliseconds are out of range.
    pub fn to_instant(&self) -> Result<Instant> {
        match *self {
            TimestampLike::Text(s) => parse_instant(s),
            TimestampLike::Instant(dt) => {
                to_millis(dt).ok_or_else(|| GrainError::InvalidDate(dt.to_rfc3339()))
            }
            TimestampLike::EpochMillis(ms) => DateTime::<Utc>::from_timestamp_millis(ms)
                .ok_or_else(|| GrainError::InvalidDate(ms.to_string())),
        }
    }
}

/// Resolve every point, preserving length and order.
///
/// Stops at the first input that cannot be resolved.
pub fn parse_points<'a, I, T>(points: I) -> Result<Vec<Instant>>
where
    I: IntoIterator<Item = T>,
    T: Into<TimestampLike<'a>>,
{
    points
        .into_iter()
        .map(|point| point.into().to_instant())
        .collect()
}

// ── Text parsing ────────────────────────────────────────────────────────────

/// Date-time layouts carrying a numeric offset. `%z` requires minutes, so a
/// bare `+01` never matches.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M%z",
];

/// Date-time layouts without an offset, read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a textual timestamp into an [`Instant`].
///
/// # Errors
///
/// Returns [`GrainError::InvalidDate`] with `input` verbatim if no accepted
/// layout matches or the time reads `:60`.
///
/// # Examples
///
/// ```
/// use time_grain_detector::parse_instant;
///
/// let instant = parse_instant("2000-01-01T00:00:00+1200").unwrap();
/// assert_eq!(instant.to_rfc3339(), "1999-12-31T12:00:00+00:00");
///
/// assert!(parse_instant("2000-01-01T00:00:00+01").is_err());
/// assert!(parse_instant("2016-12-31T23:59:60Z").is_err());
/// ```
pub fn parse_instant(input: &str) -> Result<Instant> {
    let s = input.trim();
    parse_text(s).and_then(to_millis).ok_or_else(|| {
        tracing::debug!(input, "rejected timestamp");
        GrainError::InvalidDate(input.to_string())
    })
}

/// Truncate below milliseconds. chrono stores a leap second as a
/// sub-second part of one second or more; that has no millisecond reading.
fn to_millis(dt: Instant) -> Option<Instant> {
    (dt.nanosecond() < 1_000_000_000).then(|| dt.trunc_subsecs(3))
}

fn parse_text(s: &str) -> Option<Instant> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }

    // A trailing `Z` on a layout RFC 3339 does not cover (e.g. no seconds).
    let (naive, zulu) = match s.strip_suffix(['Z', 'z']) {
        Some(rest) => (rest, true),
        None => (s, false),
    };
    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
    {
        return Some(dt.and_utc());
    }

    if zulu {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

// ── Shifts ──────────────────────────────────────────────────────────────────

/// The same instant one UTC calendar day later, or `None` past the
/// representable range.
pub(crate) fn next_day(instant: &Instant) -> Option<Instant> {
    instant.checked_add_signed(chrono::Duration::days(1))
}

/// The same instant one hour later.
pub(crate) fn next_hour(instant: &Instant) -> Option<Instant> {
    instant.checked_add_signed(chrono::Duration::hours(1))
}
