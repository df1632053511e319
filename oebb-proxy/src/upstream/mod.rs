//! Upstream schedule sources.
//!
//! Two response schemas are understood:
//! - HAFAS `mgate` TripSearch (POST, credential-gated), with times relative
//!   to the connection date and products resolved through a shared table
//! - REST journey lists (`transport.rest` and the Scotty `query.exe` JSON
//!   output), with ISO-8601 times and delays in seconds
//!
//! Both decode into a [`SourcePayload`] and are reduced to
//! [`crate::normalize::UpstreamLeg`]s by [`extract_legs`].

mod client;
mod convert;
mod error;
#[cfg(test)]
mod mock;
mod types;

pub use client::{HttpTransport, RequestMethod, Transport, UpstreamConfig, UpstreamRequest};
pub use convert::{ResponseShape, SourcePayload, decode_payload, extract_legs};
pub use error::SourceError;
#[cfg(test)]
pub(crate) use mock::{MockResponse, MockTransport};
pub use types::{
    JourneysResponse, MgateCommon, MgateConnection, MgateJourney, MgatePlatform, MgateProduct,
    MgateResponse, MgateSection, MgateServiceResult, MgateStop, MgateTripResult, RestEvent,
    RestJourney, RestLeg, RestLine, RestStop,
};
