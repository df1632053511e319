//! Conversion from upstream payloads to [`UpstreamLeg`]s.
//!
//! Each supported response schema has its own extractor; the chain only
//! sees the closed [`SourcePayload`] enum and the legs it yields.

use chrono::{Duration, NaiveDate};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::domain::{Instant, SourceFormat, parse_source_time};
use crate::normalize::{UpstreamLeg, non_empty};

use super::error::SourceError;
use super::types::{
    JourneysResponse, MgateConnection, MgateProduct, MgateResponse, MgateStop, MgateTripResult,
    RestJourney, RestLeg,
};

/// Response schema a source is expected to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// HAFAS mgate TripSearch.
    Mgate,
    /// `journeys`/`routes` list of legs with ISO-8601 times.
    Journeys,
}

impl ResponseShape {
    /// Short name used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseShape::Mgate => "mgate",
            ResponseShape::Journeys => "journeys",
        }
    }
}

/// A decoded payload whose recognizable key was present.
#[derive(Debug, Clone)]
pub enum SourcePayload {
    Mgate(MgateTripResult),
    Journeys(JourneysResponse),
}

/// Decode a response body according to the expected shape.
///
/// Fails if the body is not JSON of that shape or lacks the key that marks
/// a usable answer.
pub fn decode_payload(shape: ResponseShape, body: &str) -> Result<SourcePayload, SourceError> {
    let json_error = |e: serde_json::Error| SourceError::Json {
        message: e.to_string(),
    };

    match shape {
        ResponseShape::Mgate => {
            let response: MgateResponse = serde_json::from_str(body).map_err(json_error)?;
            let result = response
                .svc_res_l
                .and_then(|results| results.into_iter().next())
                .ok_or(SourceError::Unrecognized("no svcResL entry"))?;

            if let Some(err) = result.err.as_deref().filter(|e| *e != "OK") {
                debug!(err, "mgate service result reported an error");
                return Err(SourceError::Unrecognized("mgate service error"));
            }

            let trips = result.res.ok_or(SourceError::Unrecognized("no mgate result"))?;
            if trips.out_con_l.is_none() {
                return Err(SourceError::Unrecognized("no outConL in mgate result"));
            }
            Ok(SourcePayload::Mgate(trips))
        }
        ResponseShape::Journeys => {
            let response: JourneysResponse = serde_json::from_str(body).map_err(json_error)?;
            if response.journey_list().is_none() {
                return Err(SourceError::Unrecognized("no journeys or routes key"));
            }
            Ok(SourcePayload::Journeys(response))
        }
    }
}

/// Extract the first leg of every journey in a payload.
///
/// Journeys without legs (or, for mgate, without sections) are skipped, as
/// are entries that do not decode.
pub fn extract_legs(payload: &SourcePayload) -> Vec<UpstreamLeg> {
    match payload {
        SourcePayload::Mgate(result) => extract_mgate(result),
        SourcePayload::Journeys(response) => extract_journeys(response),
    }
}

fn extract_mgate(result: &MgateTripResult) -> Vec<UpstreamLeg> {
    let products = result
        .common
        .as_ref()
        .and_then(|c| c.prod_l.as_deref())
        .unwrap_or(&[]);

    result
        .out_con_l
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .filter_map(|raw| decode_entry::<MgateConnection>(raw, "mgate connection"))
        .filter_map(|con| mgate_leg(&con, products))
        .collect()
}

/// Decode one list entry, dropping it if it has the wrong shape.
fn decode_entry<T: DeserializeOwned>(raw: &Value, kind: &'static str) -> Option<T> {
    serde_json::from_value(raw.clone())
        .inspect_err(|e| debug!(kind, error = %e, "dropping malformed entry"))
        .ok()
}

fn mgate_leg(con: &MgateConnection, products: &[Value]) -> Option<UpstreamLeg> {
    let section = con.sec_l.as_deref()?.first()?;
    let date = con.date.as_deref();

    let default_stop = MgateStop::default();
    let dep = section.dep.as_ref().unwrap_or(&default_stop);
    let arr = section.arr.as_ref().unwrap_or(&default_stop);

    let time = |raw: Option<&String>| raw.and_then(|s| mgate_time(date, s));

    let product = section.jny.as_ref().and_then(|jny| {
        jny.prod.clone().or_else(|| {
            let raw = products.get(jny.prod_x?)?;
            decode_entry::<MgateProduct>(raw, "mgate product")
        })
    });

    let line_label = non_empty(section.name.as_deref())
        .or_else(|| product.as_ref().and_then(|p| non_empty(p.line.as_deref())));

    let departure_platform = [&dep.d_platf_r, &dep.d_platf_s, &dep.platf_r, &dep.platf_s]
        .into_iter()
        .find_map(|p| p.as_ref().and_then(|p| p.label()));
    let arrival_platform = [&arr.a_platf_r, &arr.a_platf_s, &arr.platf_r, &arr.platf_s]
        .into_iter()
        .find_map(|p| p.as_ref().and_then(|p| p.label()));

    Some(UpstreamLeg {
        planned_departure: time(dep.d_time_s.as_ref().or(dep.time_s.as_ref())),
        realtime_departure: time(dep.d_time_r.as_ref().or(dep.time_r.as_ref())),
        planned_arrival: time(arr.a_time_s.as_ref().or(arr.time_s.as_ref())),
        realtime_arrival: time(arr.a_time_r.as_ref().or(arr.time_r.as_ref())),
        delay_seconds: None,
        line_label,
        product_label: product.as_ref().and_then(|p| non_empty(p.name.as_deref())),
        departure_platform,
        arrival_platform,
    })
}

/// Resolve an mgate time against its connection date.
///
/// mgate sends `HHMMSS` on the connection date, or `DDHHMMSS` with a day
/// offset for connections that run past midnight. Without a connection date
/// the raw value goes straight to the compact codec.
fn mgate_time(date: Option<&str>, raw: &str) -> Option<Instant> {
    let raw = raw.trim();
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let Some(date) = date else {
        return parse_source_time(raw, SourceFormat::Compact);
    };

    match raw.len() {
        6 => parse_source_time(&format!("{date}{raw}"), SourceFormat::Compact),
        8 => {
            let offset_days: i64 = raw[..2].parse().ok()?;
            let base = NaiveDate::parse_from_str(date, "%Y%m%d").ok()?;
            let day = base.checked_add_signed(Duration::days(offset_days))?;
            let compact = format!("{}{}", day.format("%Y%m%d"), &raw[2..]);
            parse_source_time(&compact, SourceFormat::Compact)
        }
        _ => parse_source_time(raw, SourceFormat::Compact),
    }
}

fn extract_journeys(response: &JourneysResponse) -> Vec<UpstreamLeg> {
    response
        .journey_list()
        .unwrap_or(&[])
        .iter()
        .filter_map(|raw| decode_entry::<RestJourney>(raw, "journey"))
        .filter_map(|journey| {
            let first = journey.legs?.into_iter().next()?;
            decode_entry::<RestLeg>(&first, "journey leg")
        })
        .filter_map(|leg| rest_leg(&leg))
        .collect()
}

fn rest_leg(leg: &RestLeg) -> Option<UpstreamLeg> {
    // Walking legs and other non-train segments carry no line.
    let line = leg.line.as_ref()?;

    let iso = |raw: Option<&str>| raw.and_then(|s| parse_source_time(s, SourceFormat::Iso8601));

    let departure = iso(leg.departure.as_ref().and_then(|e| e.time()));
    let arrival = iso(leg.arrival.as_ref().and_then(|e| e.time()));

    let departure_platform = non_empty(leg.departure_platform.as_deref())
        .or_else(|| non_empty(leg.planned_departure_platform.as_deref()))
        .or_else(|| non_empty(leg.departure.as_ref().and_then(|e| e.platform())));
    let arrival_platform = non_empty(leg.arrival_platform.as_deref())
        .or_else(|| non_empty(leg.planned_arrival_platform.as_deref()))
        .or_else(|| non_empty(leg.arrival.as_ref().and_then(|e| e.platform())));

    Some(UpstreamLeg {
        planned_departure: iso(leg.planned_departure.as_deref()).or(departure),
        realtime_departure: departure,
        planned_arrival: iso(leg.planned_arrival.as_deref()).or(arrival),
        realtime_arrival: arrival,
        delay_seconds: leg.departure_delay.map(|s| s.floor() as i64),
        line_label: non_empty(line.name.as_deref()),
        product_label: non_empty(line.product_name.as_deref()),
        departure_platform,
        arrival_platform,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::format_clock;

    #[test]
    fn mgate_connection_with_inline_product() {
        let body = r#"{
            "ver": "1.61",
            "err": "OK",
            "svcResL": [{
                "meth": "TripSearch",
                "err": "OK",
                "res": {
                    "outConL": [{
                        "date": "20250812",
                        "secL": [{
                            "type": "JNY",
                            "dep": {"dTimeS": "073000", "dTimeR": "073300", "dPlatfS": "3"},
                            "arr": {"aTimeS": "083700", "aPlatfS": {"txt": "5"}},
                            "jny": {"prod": {"name": "WB 8652"}}
                        }]
                    }]
                }
            }]
        }"#;

        let payload = decode_payload(ResponseShape::Mgate, body).unwrap();
        let legs = extract_legs(&payload);
        assert_eq!(legs.len(), 1);

        let leg = &legs[0];
        assert_eq!(format_clock(leg.planned_departure.as_ref()), "07:30");
        assert_eq!(format_clock(leg.realtime_departure.as_ref()), "07:33");
        assert_eq!(format_clock(leg.planned_arrival.as_ref()), "08:37");
        assert!(leg.realtime_arrival.is_none());
        assert_eq!(leg.product_label.as_deref(), Some("WB 8652"));
        assert_eq!(leg.line_label, None);
        assert_eq!(leg.departure_platform.as_deref(), Some("3"));
        assert_eq!(leg.arrival_platform.as_deref(), Some("5"));
        assert_eq!(leg.delay_seconds, None);
    }

    #[test]
    fn mgate_product_resolved_through_common() {
        let body = r#"{
            "svcResL": [{
                "err": "OK",
                "res": {
                    "common": {"prodL": [{"name": "RJX 762", "line": "RJX"}, {"name": "WB 8652"}]},
                    "outConL": [{
                        "date": "20250812",
                        "secL": [{"dep": {"dTimeS": "074500"}, "jny": {"prodX": 1}}]
                    }]
                }
            }]
        }"#;
        let payload = decode_payload(ResponseShape::Mgate, body).unwrap();
        let legs = extract_legs(&payload);
        assert_eq!(legs[0].product_label.as_deref(), Some("WB 8652"));
    }

    #[test]
    fn mgate_section_name_wins_as_line() {
        let body = r#"{
            "svcResL": [{
                "res": {
                    "outConL": [{
                        "secL": [{
                            "name": "REX 1234",
                            "dep": {"dTimeS": "202508120730"},
                            "jny": {"prod": {"name": "Regional-Express", "line": "REX 7"}}
                        }]
                    }]
                }
            }]
        }"#;
        let payload = decode_payload(ResponseShape::Mgate, body).unwrap();
        let leg = &extract_legs(&payload)[0];
        assert_eq!(leg.line_label.as_deref(), Some("REX 1234"));
        // No connection date: compact value parsed as-is.
        assert_eq!(format_clock(leg.planned_departure.as_ref()), "07:30");
    }

    #[test]
    fn mgate_skips_connections_without_sections() {
        let body = r#"{"svcResL":[{"res":{"outConL":[
            {"date":"20250812"},
            {"date":"20250812","secL":[]}
        ]}}]}"#;
        let payload = decode_payload(ResponseShape::Mgate, body).unwrap();
        assert!(extract_legs(&payload).is_empty());
    }

    #[test]
    fn mgate_unrecognized_payloads() {
        assert!(matches!(
            decode_payload(ResponseShape::Mgate, r#"{"err":"AUTH"}"#),
            Err(SourceError::Unrecognized(_))
        ));
        assert!(matches!(
            decode_payload(ResponseShape::Mgate, r#"{"svcResL":[{"err":"LOCATION"}]}"#),
            Err(SourceError::Unrecognized(_))
        ));
        assert!(matches!(
            decode_payload(ResponseShape::Mgate, r#"{"svcResL":[{"res":{}}]}"#),
            Err(SourceError::Unrecognized(_))
        ));
        assert!(matches!(
            decode_payload(ResponseShape::Mgate, "<html>"),
            Err(SourceError::Json { .. })
        ));
    }

    #[test]
    fn mgate_badly_typed_entries_dropped() {
        let body = r#"{
            "svcResL": [{
                "res": {
                    "common": {"prodL": [{"name": 42}, {"name": "RJX 762"}]},
                    "outConL": [
                        {"date": "20250812", "secL": "broken"},
                        {
                            "date": "20250812",
                            "secL": [{"dep": {"dTimeS": "074500"}, "jny": {"prodX": 0}}]
                        },
                        {
                            "date": "20250812",
                            "secL": [{"dep": {"dTimeS": "080200"}, "jny": {"prodX": 1}}]
                        }
                    ]
                }
            }]
        }"#;
        let payload = decode_payload(ResponseShape::Mgate, body).unwrap();
        let legs = extract_legs(&payload);
        assert_eq!(legs.len(), 2);
        // Product 0 has the wrong type and resolves to nothing.
        assert_eq!(legs[0].product_label, None);
        assert_eq!(format_clock(legs[0].planned_departure.as_ref()), "07:45");
        assert_eq!(legs[1].product_label.as_deref(), Some("RJX 762"));
    }

    #[test]
    fn mgate_time_on_connection_date() {
        let t = mgate_time(Some("20250812"), "073000").unwrap();
        assert_eq!(t.format("%Y-%m-%d %H:%M").to_string(), "2025-08-12 07:30");
    }

    #[test]
    fn mgate_time_in_dst_gap() {
        // 2025-03-30 02:00 to 03:00 does not exist in Vienna.
        assert!(mgate_time(Some("20250330"), "023000").is_none());
        assert!(mgate_time(Some("20250329"), "01023000").is_none());
        assert!(mgate_time(Some("20250329"), "01033000").is_some());
    }

    #[test]
    fn mgate_realtime_past_midnight() {
        let body = r#"{"svcResL":[{"res":{"outConL":[{
            "date": "20250812",
            "secL": [{
                "dep": {"dTimeS": "235500", "dTimeR": "01000500"},
                "jny": {"prod": {"name": "NJ 490"}}
            }]
        }]}}]}"#;
        let payload = decode_payload(ResponseShape::Mgate, body).unwrap();
        let leg = &extract_legs(&payload)[0];

        let planned = leg.planned_departure.unwrap();
        let realtime = leg.realtime_departure.unwrap();
        assert_eq!(planned.format("%Y-%m-%d %H:%M").to_string(), "2025-08-12 23:55");
        assert_eq!(realtime.format("%Y-%m-%d %H:%M").to_string(), "2025-08-13 00:05");
        assert_eq!((realtime - planned).num_minutes(), 10);
    }

    #[test]
    fn mgate_time_day_offset() {
        let t = mgate_time(Some("20250812"), "01003000").unwrap();
        assert_eq!(t.format("%Y-%m-%d %H:%M").to_string(), "2025-08-13 00:30");

        let t = mgate_time(Some("20250831"), "01003000").unwrap();
        assert_eq!(t.format("%Y-%m-%d %H:%M").to_string(), "2025-09-01 00:30");
    }

    #[test]
    fn mgate_time_without_date() {
        assert!(mgate_time(None, "073000").is_none());
        assert!(mgate_time(None, "20250812").is_some());
        assert!(mgate_time(Some("20250812"), "0730").is_none());
    }

    #[test]
    fn journeys_first_leg_only() {
        let body = r#"{
            "journeys": [{
                "legs": [
                    {
                        "departure": "2025-08-12T07:33:00+02:00",
                        "plannedDeparture": "2025-08-12T07:30:00+02:00",
                        "departureDelay": 180,
                        "arrival": "2025-08-12T08:40:00+02:00",
                        "plannedArrival": "2025-08-12T08:37:00+02:00",
                        "departurePlatform": "3",
                        "arrivalPlatform": "5",
                        "line": {"name": "WB 8652", "productName": "WB"}
                    },
                    {
                        "departure": "2025-08-12T09:00:00+02:00",
                        "line": {"name": "S 1"}
                    }
                ]
            }]
        }"#;
        let payload = decode_payload(ResponseShape::Journeys, body).unwrap();
        let legs = extract_legs(&payload);
        assert_eq!(legs.len(), 1);

        let leg = &legs[0];
        assert_eq!(format_clock(leg.planned_departure.as_ref()), "07:30");
        assert_eq!(format_clock(leg.realtime_departure.as_ref()), "07:33");
        assert_eq!(format_clock(leg.realtime_arrival.as_ref()), "08:40");
        assert_eq!(leg.delay_seconds, Some(180));
        assert_eq!(leg.line_label.as_deref(), Some("WB 8652"));
        assert_eq!(leg.product_label.as_deref(), Some("WB"));
        assert_eq!(leg.departure_platform.as_deref(), Some("3"));
        assert_eq!(leg.arrival_platform.as_deref(), Some("5"));
    }

    #[test]
    fn journeys_badly_typed_legs_dropped() {
        let body = r#"{"journeys":[
            {"legs":[{
                "departure": "2025-08-12T07:30:00+02:00",
                "departurePlatform": "3",
                "line": {"name": "WB 8652"}
            }]},
            {"legs":[{
                "departure": "2025-08-12T07:45:00+02:00",
                "departurePlatform": 3,
                "line": {"name": "RJ 540"}
            }]},
            {"legs":[{
                "departure": "2025-08-12T08:00:00+02:00",
                "departureDelay": "late",
                "line": {"name": "RJ 542"}
            }]},
            {"legs":[{"departure": "2025-08-12T08:15:00+02:00", "line": "RJX"}]},
            {"legs":"none"},
            null
        ]}"#;
        let payload = decode_payload(ResponseShape::Journeys, body).unwrap();
        let legs = extract_legs(&payload);
        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0].line_label.as_deref(), Some("WB 8652"));
        assert_eq!(legs[0].departure_platform.as_deref(), Some("3"));
    }

    #[test]
    fn journeys_missing_delay_left_to_instants() {
        let body = r#"{"routes":[{"legs":[{
            "departure": "2025-08-12T07:30:00+02:00",
            "departureDelay": null,
            "line": {}
        }]}]}"#;
        let payload = decode_payload(ResponseShape::Journeys, body).unwrap();
        let leg = &extract_legs(&payload)[0];
        assert_eq!(leg.delay_seconds, None);
        assert_eq!(leg.planned_departure, leg.realtime_departure);
        assert_eq!(leg.line_label, None);
    }

    #[test]
    fn journeys_platform_fallbacks() {
        let body = r#"{"journeys":[{"legs":[{
            "departure": {"platform": "", "plannedPlatform": "2"},
            "plannedDeparturePlatform": null,
            "arrival": "2025-08-12T08:37:00+02:00",
            "plannedArrivalPlatform": "7",
            "line": {"name": "RJ 540"}
        }]}]}"#;
        let payload = decode_payload(ResponseShape::Journeys, body).unwrap();
        let leg = &extract_legs(&payload)[0];
        assert_eq!(leg.departure_platform.as_deref(), Some("2"));
        assert_eq!(leg.arrival_platform.as_deref(), Some("7"));
        assert!(leg.planned_departure.is_none());
    }

    #[test]
    fn journeys_skip_legless_and_lineless() {
        let body = r#"{"journeys":[
            {"legs":[]},
            {},
            {"legs":[{"departure":"2025-08-12T07:30:00+02:00","walking":true}]}
        ]}"#;
        let payload = decode_payload(ResponseShape::Journeys, body).unwrap();
        assert!(extract_legs(&payload).is_empty());
    }

    #[test]
    fn journeys_unrecognized_payloads() {
        assert!(matches!(
            decode_payload(ResponseShape::Journeys, r#"{"message":"rate limited"}"#),
            Err(SourceError::Unrecognized(_))
        ));
        assert!(matches!(
            decode_payload(ResponseShape::Journeys, "not json"),
            Err(SourceError::Json { .. })
        ));
    }
}
