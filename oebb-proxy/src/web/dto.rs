//! Data transfer objects for web responses.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::coordinator::{FetchError, FetchOutcome};
use crate::domain::{RouteDirection, TrainDeparture};
use crate::fallback::STATIC_SOURCE;

/// Source reported when nothing could be fetched.
pub const NO_SOURCE: &str = "none - all APIs failed";

/// Departures envelope for one direction.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainsResponse {
    /// Direction label, e.g. `St. Pölten → Linz`
    pub route: String,

    /// When the response was produced (RFC 3339, UTC, milliseconds)
    pub timestamp: String,

    /// At most three departures, soonest first
    pub trains: Vec<TrainDeparture>,

    /// Name of the source the departures came from
    pub source: String,

    /// Whether `trains` reflects live data
    pub real_time_data: bool,

    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TrainsResponse {
    /// Successful fetch.
    pub fn live(direction: RouteDirection, outcome: FetchOutcome, at: DateTime<Utc>) -> Self {
        Self {
            route: direction.label().to_string(),
            timestamp: timestamp(at),
            trains: outcome.trains,
            source: outcome.source,
            real_time_data: true,
            success: true,
            error: None,
        }
    }

    /// Failed fetch with no departures.
    pub fn failed(error: &FetchError, at: DateTime<Utc>) -> Self {
        Self {
            route: error.direction().label().to_string(),
            timestamp: timestamp(at),
            trains: Vec::new(),
            source: NO_SOURCE.to_string(),
            real_time_data: false,
            success: false,
            error: Some(error.to_string()),
        }
    }

    /// Failed fetch answered from the static timetable.
    pub fn static_schedule(
        error: &FetchError,
        trains: Vec<TrainDeparture>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            route: error.direction().label().to_string(),
            timestamp: timestamp(at),
            trains,
            source: STATIC_SOURCE.to_string(),
            real_time_data: false,
            success: false,
            error: Some(error.to_string()),
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Service description served at `/` and `/api`.
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub description: &'static str,
    pub endpoints: Vec<String>,
    pub version: &'static str,
    pub features: Vec<&'static str>,
}

impl IndexResponse {
    pub fn new() -> Self {
        Self {
            message: "ÖBB Proxy - Transport REST API (Real Data)",
            description: "Uses real ÖBB and transport.rest APIs for live train data",
            endpoints: RouteDirection::ALL
                .iter()
                .map(|d| format!("/api/trains/{}", d.slug()))
                .collect(),
            version: env!("CARGO_PKG_VERSION"),
            features: vec![
                "Real-time data",
                "Actual delays",
                "Live departures",
                "Sorted by actual departure time",
            ],
        }
    }
}

impl Default for IndexResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
