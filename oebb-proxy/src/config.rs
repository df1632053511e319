//! Process configuration.
//!
//! Read once at startup from environment variables. Invalid values are
//! reported as [`ConfigError`]s rather than silently replaced by defaults.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::chain::{RouteConfig, SourceDescriptor};
use crate::domain::{InvalidStationId, RouteDirection, StationId};
use crate::upstream::{ResponseShape, UpstreamConfig};

pub const ENV_HAFAS_AID: &str = "HAFAS_AID";
pub const ENV_BIND_ADDR: &str = "OEBB_PROXY_ADDR";
pub const ENV_FALLBACK: &str = "OEBB_PROXY_FALLBACK";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

const ST_POELTEN_ID: &str = "8100008";
const LINZ_ID: &str = "8100013";
const ST_POELTEN_NAME: &str = "St. Pölten Hbf";
const LINZ_NAME: &str = "Linz Hbf";

const MGATE_URL: &str = "https://fahrplan.oebb.at/bin/mgate.exe";
const SCOTTY_URL: &str = concat!(
    "https://fahrplan.oebb.at/bin/query.exe/dny",
    "?S={from_name}&Z={to_name}&date={date}&time={time}",
    "&start=1&prod=1111111111111111",
    "&REQ0JourneyStopsS0A=1&REQ0JourneyStopsZ0A=1&output=json",
);
const DB_REST_V6_URL: &str = "https://v6.db.transport.rest/journeys?from={from}&to={to}&results=5";
const MACISTRY_URL: &str = "https://oebb.macistry.com/api/journeys?from={from}&to={to}";
const DB_REST_V5_URL: &str = "https://v5.db.transport.rest/journeys?from={from}&to={to}&results=5";

/// Public transport.rest instances are slower than the ÖBB endpoints.
const TRANSPORT_REST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name}: {message}")]
    InvalidValue { name: &'static str, message: String },

    #[error(transparent)]
    InvalidStation(#[from] InvalidStationId),
}

/// What the HTTP boundary serves when every source has failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// HTTP 500 with an empty train list.
    #[default]
    Error,
    /// HTTP 200 with the approximate clock-face schedule.
    StaticSchedule,
}

impl FromStr for FallbackPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(FallbackPolicy::Error),
            "static" => Ok(FallbackPolicy::StaticSchedule),
            other => Err(ConfigError::InvalidValue {
                name: ENV_FALLBACK,
                message: format!("expected `error` or `static`, got `{other}`"),
            }),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub bind_addr: SocketAddr,

    /// mgate credential; `None` disables the primary source.
    pub hafas_aid: Option<String>,

    pub fallback: FallbackPolicy,
    pub upstream: UpstreamConfig,
}

impl ProxyConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr = set(ENV_BIND_ADDR)
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                name: ENV_BIND_ADDR,
                message: e.to_string(),
            })?;

        let fallback = set(ENV_FALLBACK)
            .map(|v| v.parse::<FallbackPolicy>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            bind_addr,
            hafas_aid: set(ENV_HAFAS_AID).map(|v| v.trim().to_string()),
            fallback,
            upstream: UpstreamConfig::default(),
        })
    }
}

/// Source chains for both directions.
///
/// The mgate primary comes first, then the Scotty JSON endpoint and the
/// transport.rest mirrors.
pub fn default_routes() -> Result<Vec<RouteConfig>, ConfigError> {
    let st_poelten = StationId::parse(ST_POELTEN_ID)?;
    let linz = StationId::parse(LINZ_ID)?;

    let route = |direction: RouteDirection,
                 from: &StationId,
                 to: &StationId,
                 from_name: &str,
                 to_name: &str| {
        RouteConfig::new(direction, from.clone(), to.clone(), from_name, to_name)
            .with_primary(SourceDescriptor::new(
                "oebb-hafas-mgate",
                MGATE_URL,
                ResponseShape::Mgate,
            ))
            .with_source(SourceDescriptor::new(
                "oebb-scotty-query",
                SCOTTY_URL,
                ResponseShape::Journeys,
            ))
            .with_source(
                SourceDescriptor::new(
                    "db-transport-rest-v6",
                    DB_REST_V6_URL,
                    ResponseShape::Journeys,
                )
                .with_timeout(TRANSPORT_REST_TIMEOUT),
            )
            .with_source(SourceDescriptor::new(
                "oebb-macistry",
                MACISTRY_URL,
                ResponseShape::Journeys,
            ))
            .with_source(
                SourceDescriptor::new(
                    "db-transport-rest-v5",
                    DB_REST_V5_URL,
                    ResponseShape::Journeys,
                )
                .with_timeout(TRANSPORT_REST_TIMEOUT),
            )
    };

    Ok(vec![
        route(
            RouteDirection::StPoeltenToLinz,
            &st_poelten,
            &linz,
            ST_POELTEN_NAME,
            LINZ_NAME,
        ),
        route(
            RouteDirection::LinzToStPoelten,
            &linz,
            &st_poelten,
            LINZ_NAME,
            ST_POELTEN_NAME,
        ),
    ])
}
