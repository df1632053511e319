//! Ordered fallback over upstream sources.
//!
//! A [`RouteConfig`] lists the sources for one direction; [`SourceChain`]
//! tries them one after another until one yields departures. Sources are
//! never raced.

use std::time::Duration;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::{Instant, RouteDirection, StationId};
use crate::normalize::{Candidate, normalize_legs};
use crate::upstream::{
    ResponseShape, SourceError, Transport, UpstreamRequest, decode_payload, extract_legs,
};

/// Per-request time bound unless a source overrides it.
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(10);

/// mgate product filter selecting every product class.
const ALL_PRODUCTS: &str = "1111111111111111";

/// One upstream endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDescriptor {
    /// Name reported in responses when this source wins.
    pub name: String,

    /// URL with `{from}`, `{to}`, `{from_name}`, `{to_name}`, `{date}` and
    /// `{time}` placeholders.
    pub url_template: String,

    pub shape: ResponseShape,
    pub timeout: Duration,
}

impl SourceDescriptor {
    pub fn new(
        name: impl Into<String>,
        url_template: impl Into<String>,
        shape: ResponseShape,
    ) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
            shape,
            timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fill in the URL placeholders for a route at `now` (Vienna clock).
    pub fn render_url(&self, route: &RouteConfig, now: &Instant) -> String {
        self.url_template
            .replace("{from}", route.from.as_str())
            .replace("{to}", route.to.as_str())
            .replace("{from_name}", &urlencoding::encode(&route.from_name))
            .replace("{to_name}", &urlencoding::encode(&route.to_name))
            .replace("{date}", &now.format("%Y%m%d").to_string())
            .replace("{time}", &now.format("%H%M").to_string())
    }
}

/// Everything needed to query upstreams for one direction.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteConfig {
    pub direction: RouteDirection,
    pub from: StationId,
    pub to: StationId,

    /// Station names as the mgate location search expects them.
    pub from_name: String,
    pub to_name: String,

    /// Credential-gated mgate source, tried before `sources`.
    pub primary: Option<SourceDescriptor>,

    /// Fallback sources in priority order.
    pub sources: Vec<SourceDescriptor>,
}

impl RouteConfig {
    pub fn new(
        direction: RouteDirection,
        from: StationId,
        to: StationId,
        from_name: impl Into<String>,
        to_name: impl Into<String>,
    ) -> Self {
        Self {
            direction,
            from,
            to,
            from_name: from_name.into(),
            to_name: to_name.into(),
            primary: None,
            sources: Vec::new(),
        }
    }

    pub fn with_primary(mut self, primary: SourceDescriptor) -> Self {
        self.primary = Some(primary);
        self
    }

    pub fn with_source(mut self, source: SourceDescriptor) -> Self {
        self.sources.push(source);
        self
    }
}

/// Result of a chain run: the winning source and its candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainOutcome {
    pub source: String,
    pub candidates: Vec<Candidate>,
}

/// No source answered with a recognizable payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("all sources failed (tried: {})", .attempted.join(", "))]
pub struct SourcesExhausted {
    pub attempted: Vec<String>,
}

/// Sequential source fallback over a [`Transport`].
#[derive(Debug, Clone)]
pub struct SourceChain<T> {
    transport: T,
    credential: Option<String>,
}

impl<T: Transport> SourceChain<T> {
    /// Create a chain. An empty credential counts as none.
    pub fn new(transport: T, credential: Option<String>) -> Self {
        Self {
            transport,
            credential: credential.filter(|c| !c.trim().is_empty()),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Try each source in order.
    ///
    /// The first source yielding at least one usable departure wins. If none
    /// does but some fallback source answered recognizably, the first such
    /// source is reported with no candidates. An empty primary answer only
    /// advances the chain.
    pub async fn run(
        &self,
        route: &RouteConfig,
        now: &Instant,
    ) -> Result<ChainOutcome, SourcesExhausted> {
        let mut attempted = Vec::new();
        let mut first_responder: Option<String> = None;

        let primary = route.primary.iter().map(|s| (s, true));
        let fallbacks = route.sources.iter().map(|s| (s, false));

        for (source, is_primary) in primary.chain(fallbacks) {
            let Some(request) = self.request_for(source, route, now) else {
                debug!(source = %source.name, "no credential configured, skipping source");
                continue;
            };
            attempted.push(source.name.clone());

            match self.try_source(source, &request).await {
                Ok(candidates) if !candidates.is_empty() => {
                    info!(
                        source = %source.name,
                        direction = %route.direction,
                        count = candidates.len(),
                        "source returned departures"
                    );
                    return Ok(ChainOutcome {
                        source: source.name.clone(),
                        candidates,
                    });
                }
                Ok(_) => {
                    debug!(source = %source.name, "source returned no usable departures");
                    if !is_primary {
                        first_responder.get_or_insert_with(|| source.name.clone());
                    }
                }
                Err(err) => {
                    warn!(
                        source = %source.name,
                        shape = source.shape.as_str(),
                        direction = %route.direction,
                        error = %err,
                        "source unavailable"
                    );
                }
            }
        }

        match first_responder {
            Some(source) => Ok(ChainOutcome {
                source,
                candidates: Vec::new(),
            }),
            None => Err(SourcesExhausted { attempted }),
        }
    }

    fn request_for(
        &self,
        source: &SourceDescriptor,
        route: &RouteConfig,
        now: &Instant,
    ) -> Option<UpstreamRequest> {
        let url = source.render_url(route, now);
        match source.shape {
            ResponseShape::Mgate => {
                let aid = self.credential.as_deref()?;
                Some(UpstreamRequest::post(url, mgate_body(route, aid), source.timeout))
            }
            ResponseShape::Journeys => Some(UpstreamRequest::get(url, source.timeout)),
        }
    }

    async fn try_source(
        &self,
        source: &SourceDescriptor,
        request: &UpstreamRequest,
    ) -> Result<Vec<Candidate>, SourceError> {
        let body = self.transport.send(request).await?;
        let payload = decode_payload(source.shape, &body)?;
        let legs = extract_legs(&payload);
        Ok(normalize_legs(&legs))
    }
}

/// mgate TripSearch request for the route's station names.
fn mgate_body(route: &RouteConfig, aid: &str) -> serde_json::Value {
    json!({
        "lang": "deu",
        "ver": "1.61",
        "auth": {"aid": aid},
        "client": {"id": "OEBB", "type": "WEB", "name": "webapp", "v": "1.0"},
        "svcReqL": [{
            "meth": "TripSearch",
            "req": {
                "depLocL": [{"name": route.from_name}],
                "arrLocL": [{"name": route.to_name}],
                "getIST": true,
                "jnyFltrL": [{"type": "PROD", "mode": "INC", "value": ALL_PRODUCTS}],
                "outFrwd": true,
                "numF": 5
            }
        }],
        "ext": "OEBB.1"
    })
}
