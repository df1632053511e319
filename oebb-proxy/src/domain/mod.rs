//! Domain types for the departures proxy.
//!
//! Everything here is source-agnostic: upstream payloads are decoded in
//! [`crate::upstream`] and only reach this layer as plain values.

mod delay;
mod departure;
mod route;
mod time;

pub use delay::{Delay, DelayStatus};
pub use departure::TrainDeparture;
pub use route::{InvalidStationId, RouteDirection, StationId};
pub use time::{
    Instant, SourceFormat, UNKNOWN_CLOCK, format_clock, parse_source_time, vienna_local,
    vienna_now,
};
