//! Normalization of upstream legs into [`TrainDeparture`] records.
//!
//! Every source extractor reduces its own payload to [`UpstreamLeg`]s; this
//! module is the single place that turns those into the canonical record, so
//! the field rules below hold regardless of where a leg came from.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{Delay, Instant, TrainDeparture, format_clock};

/// Most departures ever returned for one request.
pub const MAX_DEPARTURES: usize = 3;

/// Label used when a leg carries no identifying data at all.
const FALLBACK_TRAIN_NUMBER: &str = "RJ ???";

/// Product family assumed when nothing better is known.
const FALLBACK_TRAIN_TYPE: &str = "RJ";

const UNKNOWN_PLATFORM: &str = "?";

/// Source-agnostic view of one journey leg.
///
/// `realtime_*` fields are only set when the source reported a realised or
/// predicted time; they are `None` when only the timetable is known.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpstreamLeg {
    pub planned_departure: Option<Instant>,
    pub realtime_departure: Option<Instant>,
    pub planned_arrival: Option<Instant>,
    pub realtime_arrival: Option<Instant>,

    /// Departure delay reported directly by the source.
    pub delay_seconds: Option<i64>,

    pub line_label: Option<String>,
    pub product_label: Option<String>,

    pub departure_platform: Option<String>,
    pub arrival_platform: Option<String>,
}

impl UpstreamLeg {
    pub fn actual_departure(&self) -> Option<&Instant> {
        self.realtime_departure
            .as_ref()
            .or(self.planned_departure.as_ref())
    }

    pub fn actual_arrival(&self) -> Option<&Instant> {
        self.realtime_arrival.as_ref().or(self.planned_arrival.as_ref())
    }

    /// A leg is usable if it names a train or has any departure time.
    fn is_usable(&self) -> bool {
        self.line_label.is_some()
            || self.product_label.is_some()
            || self.actual_departure().is_some()
    }

    fn delay(&self) -> Delay {
        if let Some(seconds) = self.delay_seconds {
            return Delay::from_seconds(seconds);
        }
        if self.realtime_departure.is_some() {
            return Delay::between(
                self.planned_departure.as_ref(),
                self.realtime_departure.as_ref(),
            );
        }
        // No departure prediction: the arrival prediction is the best signal.
        Delay::between(self.planned_arrival.as_ref(), self.realtime_arrival.as_ref())
    }
}

/// A normalized record plus the instant it is ordered by.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub departure: TrainDeparture,
    pub sort_key: DateTime<Utc>,
}

/// Normalize one leg, or `None` if it carries nothing usable.
pub fn normalize_leg(leg: &UpstreamLeg) -> Option<Candidate> {
    if !leg.is_usable() {
        debug!(?leg, "dropping leg without line or time data");
        return None;
    }

    let train_number = leg
        .line_label
        .clone()
        .or_else(|| leg.product_label.clone())
        .unwrap_or_else(|| FALLBACK_TRAIN_NUMBER.to_string());

    let train_type = leg
        .product_label
        .as_deref()
        .and_then(first_word)
        .or_else(|| first_word(&train_number))
        .unwrap_or(FALLBACK_TRAIN_TYPE)
        .to_string();

    let platform = combine_platforms(
        leg.departure_platform.as_deref(),
        leg.arrival_platform.as_deref(),
    );

    let departure = TrainDeparture::new(
        format_clock(leg.actual_departure()),
        format_clock(leg.actual_arrival()),
        train_type,
        train_number,
        leg.delay(),
        platform,
    );

    let sort_key = leg
        .actual_departure()
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH);

    Some(Candidate {
        departure,
        sort_key,
    })
}

/// Normalize a batch, skipping unusable legs, sorted and truncated.
pub fn normalize_legs<'a>(legs: impl IntoIterator<Item = &'a UpstreamLeg>) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = legs.into_iter().filter_map(normalize_leg).collect();
    sort_and_truncate(&mut candidates);
    candidates
}

/// Order by departure instant and keep the first [`MAX_DEPARTURES`].
///
/// The sort is stable, so equal instants keep upstream order.
pub fn sort_and_truncate(candidates: &mut Vec<Candidate>) {
    candidates.sort_by_key(|c| c.sort_key);
    candidates.truncate(MAX_DEPARTURES);
}

/// Sort, truncate and strip the sort keys.
pub fn into_departures(mut candidates: Vec<Candidate>) -> Vec<TrainDeparture> {
    sort_and_truncate(&mut candidates);
    candidates.into_iter().map(|c| c.departure).collect()
}

fn first_word(s: &str) -> Option<&str> {
    s.split_whitespace().next()
}

fn combine_platforms(departure: Option<&str>, arrival: Option<&str>) -> String {
    match (departure, arrival) {
        (Some(dep), Some(arr)) => format!("{dep} → {arr}"),
        (Some(one), None) | (None, Some(one)) => one.to_string(),
        (None, None) => UNKNOWN_PLATFORM.to_string(),
    }
}

/// Treat empty strings from upstream as absent.
pub(crate) fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}
