//! Delay magnitude and status.

use std::fmt;

use serde::Serialize;

use super::time::Instant;

/// Punctuality bucket shown next to a departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DelayStatus {
    OnTime,
    SlightlyDelayed,
    Delayed,
}

impl DelayStatus {
    /// Upper bound (inclusive) of a "slight" delay, in minutes.
    pub const SLIGHT_LIMIT_MINS: u32 = 5;

    /// Bucket a non-negative delay.
    pub fn from_minutes(minutes: u32) -> Self {
        match minutes {
            0 => DelayStatus::OnTime,
            m if m <= Self::SLIGHT_LIMIT_MINS => DelayStatus::SlightlyDelayed,
            _ => DelayStatus::Delayed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DelayStatus::OnTime => "on-time",
            DelayStatus::SlightlyDelayed => "slightly-delayed",
            DelayStatus::Delayed => "delayed",
        }
    }
}

impl fmt::Display for DelayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A delay in whole minutes, never negative.
///
/// Early running is a data anomaly for this display and is reported as zero.
///
/// # Examples
///
/// ```
/// use oebb_proxy::domain::{Delay, DelayStatus};
///
/// assert_eq!(Delay::from_seconds(150).minutes(), 2);
/// assert_eq!(Delay::from_seconds(-600).minutes(), 0);
/// assert_eq!(Delay::from_seconds(420).status(), DelayStatus::Delayed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Delay(u32);

impl Delay {
    pub const NONE: Delay = Delay(0);

    /// Delay between a planned and a realised instant, rounded to the nearest
    /// minute (halves round up). Missing either side means no delay.
    pub fn between(planned: Option<&Instant>, actual: Option<&Instant>) -> Self {
        let (Some(planned), Some(actual)) = (planned, actual) else {
            return Self::NONE;
        };
        let millis = actual.signed_duration_since(*planned).num_milliseconds();
        Self::clamped((millis + 30_000).div_euclid(60_000))
    }

    /// Delay reported directly in seconds, truncated down to whole minutes.
    pub fn from_seconds(seconds: i64) -> Self {
        Self::clamped(seconds.div_euclid(60))
    }

    fn clamped(minutes: i64) -> Self {
        Delay(u32::try_from(minutes.max(0)).unwrap_or(u32::MAX))
    }

    pub fn minutes(&self) -> u32 {
        self.0
    }

    pub fn status(&self) -> DelayStatus {
        DelayStatus::from_minutes(self.0)
    }
}
