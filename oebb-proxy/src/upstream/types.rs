//! Upstream response DTOs.
//!
//! These types map directly to the JSON the upstream services return. They
//! use `Option` liberally because every source omits fields rather than
//! sending nulls, and several fields change type between deployments.
//!
//! List entries (connections, journeys, legs, products) are kept as raw
//! [`serde_json::Value`]s at the outer level and decoded one at a time, so a
//! single badly typed entry is dropped without failing the whole payload.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// HAFAS mgate (TripSearch)
// ---------------------------------------------------------------------------

/// Top-level mgate response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MgateResponse {
    /// One result per service request; we only ever send one.
    pub svc_res_l: Option<Vec<MgateServiceResult>>,

    /// Transport-level error code (`OK` on success).
    pub err: Option<String>,
}

/// Result of a single service request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MgateServiceResult {
    pub meth: Option<String>,

    /// Method-level error code (`OK` on success).
    pub err: Option<String>,

    pub res: Option<MgateTripResult>,
}

/// TripSearch payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MgateTripResult {
    /// Outbound connections, decoded individually as [`MgateConnection`]s.
    pub out_con_l: Option<Vec<serde_json::Value>>,

    /// Shared lookup tables referenced by index from connections.
    pub common: Option<MgateCommon>,
}

/// Lookup tables shared across a TripSearch result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MgateCommon {
    /// Products, decoded on lookup as [`MgateProduct`]s.
    pub prod_l: Option<Vec<serde_json::Value>>,
}

/// One connection (possibly with changes).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MgateConnection {
    /// Connection date `YYYYMMDD`; section times are relative to it.
    pub date: Option<String>,

    /// Sections of the connection; the first one is the direct train.
    pub sec_l: Option<Vec<MgateSection>>,
}

/// One section (leg) of a connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MgateSection {
    pub dep: Option<MgateStop>,
    pub arr: Option<MgateStop>,
    pub jny: Option<MgateJourney>,

    /// Line name, when the section carries one directly.
    pub name: Option<String>,
}

/// Departure or arrival event of a section.
///
/// Departures use the `d*` fields, arrivals the `a*` fields; some
/// deployments send the unprefixed variants instead.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MgateStop {
    pub d_time_s: Option<String>,
    pub d_time_r: Option<String>,
    pub a_time_s: Option<String>,
    pub a_time_r: Option<String>,
    pub time_s: Option<String>,
    pub time_r: Option<String>,

    pub d_platf_s: Option<MgatePlatform>,
    pub d_platf_r: Option<MgatePlatform>,
    pub a_platf_s: Option<MgatePlatform>,
    pub a_platf_r: Option<MgatePlatform>,
    pub platf_s: Option<MgatePlatform>,
    pub platf_r: Option<MgatePlatform>,
}

/// A platform, sent either as plain text or as a labelled object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MgatePlatform {
    Text(String),
    Number(serde_json::Number),
    Labelled {
        txt: Option<String>,
        name: Option<String>,
    },
}

impl MgatePlatform {
    /// Display label, if the platform carries one.
    pub fn label(&self) -> Option<String> {
        match self {
            MgatePlatform::Text(s) => Some(s.clone()),
            MgatePlatform::Number(n) => Some(n.to_string()),
            MgatePlatform::Labelled { txt, name } => txt.clone().or_else(|| name.clone()),
        }
        .filter(|s| !s.is_empty())
    }
}

/// The vehicle journey serving a section.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MgateJourney {
    /// Inline product, sent by some deployments.
    pub prod: Option<MgateProduct>,

    /// Index into `common.prodL`.
    pub prod_x: Option<usize>,
}

/// Product (train) description.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MgateProduct {
    /// Full product name, e.g. `WB 8652`.
    pub name: Option<String>,

    /// Line label, when distinct from the name.
    pub line: Option<String>,
}

// ---------------------------------------------------------------------------
// REST journeys (transport.rest, Scotty query.exe JSON)
// ---------------------------------------------------------------------------

/// Top-level REST journeys response.
///
/// `transport.rest` uses `journeys`; some mirrors use `routes`.
#[derive(Debug, Clone, Deserialize)]
pub struct JourneysResponse {
    pub journeys: Option<Vec<serde_json::Value>>,
    pub routes: Option<Vec<serde_json::Value>>,
}

impl JourneysResponse {
    /// The raw journey list under whichever key the source used.
    pub fn journey_list(&self) -> Option<&[serde_json::Value]> {
        self.journeys.as_deref().or(self.routes.as_deref())
    }
}

/// One journey of a REST response.
#[derive(Debug, Clone, Deserialize)]
pub struct RestJourney {
    /// Legs, decoded individually as [`RestLeg`]s.
    pub legs: Option<Vec<serde_json::Value>>,
}

/// One leg of a REST journey.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestLeg {
    /// Realtime departure (ISO-8601), or a stop object on some mirrors.
    pub departure: Option<RestEvent>,
    pub planned_departure: Option<String>,

    /// Departure delay in seconds.
    pub departure_delay: Option<f64>,

    pub arrival: Option<RestEvent>,
    pub planned_arrival: Option<String>,

    pub departure_platform: Option<String>,
    pub planned_departure_platform: Option<String>,
    pub arrival_platform: Option<String>,
    pub planned_arrival_platform: Option<String>,

    pub line: Option<RestLine>,
}

/// A departure/arrival field: usually a timestamp, occasionally an object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RestEvent {
    At(String),
    Stop(RestStop),
}

impl RestEvent {
    pub fn time(&self) -> Option<&str> {
        match self {
            RestEvent::At(s) => Some(s.as_str()),
            RestEvent::Stop(_) => None,
        }
    }

    /// Realtime platform, falling back to the planned one.
    pub fn platform(&self) -> Option<&str> {
        match self {
            RestEvent::At(_) => None,
            RestEvent::Stop(stop) => stop
                .platform
                .as_deref()
                .filter(|s| !s.is_empty())
                .or(stop.planned_platform.as_deref()),
        }
    }
}

/// Stop object variant of [`RestEvent`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestStop {
    pub platform: Option<String>,
    pub planned_platform: Option<String>,
}

/// Line description of a REST leg.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestLine {
    /// Line label, e.g. `RJX 762`.
    pub name: Option<String>,

    /// Product family, e.g. `RJX`.
    pub product_name: Option<String>,
}
