//! Approximate clock-face timetable.
//!
//! Served in place of live data when every upstream source has failed and
//! the static fallback is enabled. Departures repeat at fixed minutes past
//! each hour of the operating day; nothing here is realtime.

use chrono::{Duration, NaiveDate};

use crate::domain::{Delay, Instant, RouteDirection, TrainDeparture, format_clock, vienna_local};
use crate::normalize::MAX_DEPARTURES;

/// Source name reported for static departures.
pub const STATIC_SOURCE: &str = "static-schedule";

/// First and last hour with departures.
const FIRST_HOUR: u32 = 5;
const LAST_HOUR: u32 = 22;

/// One departure per hour at a fixed minute.
#[derive(Debug, Clone, Copy)]
struct Slot {
    minute: u32,
    train_type: &'static str,
    travel_mins: i64,
}

const fn slot(minute: u32, train_type: &'static str, travel_mins: i64) -> Slot {
    Slot {
        minute,
        train_type,
        travel_mins,
    }
}

const ST_POELTEN_TO_LINZ: &[Slot] = &[
    slot(2, "RJX", 46),
    slot(16, "WB", 50),
    slot(32, "RJ", 52),
    slot(46, "REX", 88),
];

const LINZ_TO_ST_POELTEN: &[Slot] = &[
    slot(14, "RJX", 46),
    slot(28, "WB", 50),
    slot(44, "RJ", 52),
    slot(58, "REX", 88),
];

fn slots(direction: RouteDirection) -> &'static [Slot] {
    match direction {
        RouteDirection::StPoeltenToLinz => ST_POELTEN_TO_LINZ,
        RouteDirection::LinzToStPoelten => LINZ_TO_ST_POELTEN,
    }
}

/// The next scheduled departures strictly after `now`.
///
/// Rolls over into the next day after the last departure. Every record is
/// on time with an unknown platform.
pub fn static_schedule(direction: RouteDirection, now: &Instant) -> Vec<TrainDeparture> {
    let today = now.date_naive();
    [Some(today), today.succ_opt()]
        .into_iter()
        .flatten()
        .flat_map(|day| departures_on(day, direction))
        .filter(|(departure, _)| departure > now)
        .take(MAX_DEPARTURES)
        .map(|(departure, slot)| {
            let arrival = departure + Duration::minutes(slot.travel_mins);
            TrainDeparture::new(
                format_clock(Some(&departure)),
                format_clock(Some(&arrival)),
                slot.train_type.to_string(),
                format!("{} ???", slot.train_type),
                Delay::NONE,
                "?".to_string(),
            )
        })
        .collect()
}

fn departures_on(
    day: NaiveDate,
    direction: RouteDirection,
) -> impl Iterator<Item = (Instant, Slot)> {
    (FIRST_HOUR..=LAST_HOUR).flat_map(move |hour| {
        slots(direction).iter().filter_map(move |slot| {
            let naive = day.and_hms_opt(hour, slot.minute, 0)?;
            Some((vienna_local(naive)?, *slot))
        })
    })
}
