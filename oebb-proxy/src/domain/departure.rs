//! The canonical departure record served to clients.

use serde::Serialize;

use super::delay::{Delay, DelayStatus};

/// One direct train departure, in the shape every source is normalized to.
///
/// Serializes with the field names the frontend consumes
/// (`departure`, `arrival`, `delay`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainDeparture {
    /// Actual departure on the Vienna clock, `HH:MM` or `?`.
    #[serde(rename = "departure")]
    pub departure_clock: String,

    /// Actual arrival on the Vienna clock, `HH:MM` or `?`.
    #[serde(rename = "arrival")]
    pub arrival_clock: String,

    /// Product family, e.g. `RJ`, `WB`, `REX`.
    pub train_type: String,

    /// Line or train label, e.g. `WB 8652`.
    pub train_number: String,

    /// Departure delay in whole minutes.
    #[serde(rename = "delay")]
    pub delay_minutes: u32,

    pub status: DelayStatus,

    /// Departure platform, `dep → arr` when both are known, or `?`.
    pub platform: String,
}

impl TrainDeparture {
    /// Build a record whose status is derived from its delay.
    pub fn new(
        departure_clock: String,
        arrival_clock: String,
        train_type: String,
        train_number: String,
        delay: Delay,
        platform: String,
    ) -> Self {
        Self {
            departure_clock,
            arrival_clock,
            train_type,
            train_number,
            delay_minutes: delay.minutes(),
            status: delay.status(),
            platform,
        }
    }
}
