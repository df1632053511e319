//! Upstream time parsing and display.
//!
//! The two upstream families encode times incompatibly: HAFAS sends compact
//! digit strings (`YYYYMMDD`, `YYYYMMDDHHMM`, `YYYYMMDDHHMMSS`) while the
//! REST journey APIs send ISO-8601 date-times. Both are brought to a single
//! [`Instant`] tagged with the Europe/Vienna zone so that the normalizer never
//! has to care which source a time came from.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Europe::Vienna;
use chrono_tz::Tz;

/// An absolute point in time, carried in the Vienna zone for display.
pub type Instant = DateTime<Tz>;

/// Placeholder shown when a time is unknown.
pub const UNKNOWN_CLOCK: &str = "?";

/// The raw encoding a source uses for its times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Compact digit string of length 8, 12 or 14 (HAFAS).
    Compact,
    /// ISO-8601 date-time, with or without offset (REST journey APIs).
    Iso8601,
}

/// Parse a raw upstream time into an [`Instant`].
///
/// Returns `None` for anything that cannot be read; callers treat that as
/// "time unknown" rather than as an error.
///
/// # Examples
///
/// ```
/// use oebb_proxy::domain::{SourceFormat, format_clock, parse_source_time};
///
/// let t = parse_source_time("202508120730", SourceFormat::Compact);
/// assert_eq!(format_clock(t.as_ref()), "07:30");
///
/// let t = parse_source_time("2025-08-12T07:30:00+02:00", SourceFormat::Iso8601);
/// assert_eq!(format_clock(t.as_ref()), "07:30");
///
/// assert!(parse_source_time("2025081207", SourceFormat::Compact).is_none());
/// ```
pub fn parse_source_time(raw: &str, format: SourceFormat) -> Option<Instant> {
    match format {
        SourceFormat::Compact => parse_compact(raw),
        SourceFormat::Iso8601 => parse_iso(raw),
    }
}

/// Render an instant as `HH:MM` on the Vienna clock, or `"?"` if unknown.
pub fn format_clock(instant: Option<&Instant>) -> String {
    match instant {
        Some(t) => t.with_timezone(&Vienna).format("%H:%M").to_string(),
        None => UNKNOWN_CLOCK.to_string(),
    }
}

/// Interpret a wall-clock time as Vienna local time.
///
/// Times inside the spring-forward gap do not exist and yield `None`; times
/// repeated in autumn resolve to the earlier instant.
pub fn vienna_local(naive: NaiveDateTime) -> Option<Instant> {
    Vienna.from_local_datetime(&naive).earliest()
}

/// The current instant on the Vienna clock.
pub fn vienna_now() -> Instant {
    chrono::Utc::now().with_timezone(&Vienna)
}

fn parse_compact(raw: &str) -> Option<Instant> {
    let s = raw.trim();
    if !matches!(s.len(), 8 | 12 | 14) || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[4..6].parse().ok()?;
    let day: u32 = s[6..8].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    // Seconds in the 14-char form are ignored.
    let time = if s.len() >= 12 {
        let hour: u32 = s[8..10].parse().ok()?;
        let minute: u32 = s[10..12].parse().ok()?;
        NaiveTime::from_hms_opt(hour, minute, 0)?
    } else {
        NaiveTime::MIN
    };

    vienna_local(date.and_time(time))
}

fn parse_iso(raw: &str) -> Option<Instant> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Vienna));
    }

    // No offset: read as Vienna wall-clock time.
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .and_then(vienna_local)
}
