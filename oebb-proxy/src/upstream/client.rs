//! HTTP transport for upstream sources.
//!
//! The source chain talks to upstreams through the [`Transport`] trait so
//! tests can substitute a canned transport; [`HttpTransport`] is the
//! reqwest-backed implementation used in production.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};

use super::error::SourceError;

/// Browser-like agent; several upstreams reject unknown clients.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Default connect timeout, separate from the per-request bound.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// HTTP method and body of an upstream request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestMethod {
    Get,
    /// POST with a JSON body.
    Post(serde_json::Value),
}

/// A fully rendered upstream request.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub method: RequestMethod,
    pub url: String,
    pub timeout: Duration,
}

impl UpstreamRequest {
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method: RequestMethod::Get,
            url: url.into(),
            timeout,
        }
    }

    pub fn post(url: impl Into<String>, body: serde_json::Value, timeout: Duration) -> Self {
        Self {
            method: RequestMethod::Post(body),
            url: url.into(),
            timeout,
        }
    }
}

/// Sends upstream requests and returns the raw response body.
///
/// Implementations must map non-2xx statuses and timeouts to
/// [`SourceError`]s; decoding is left to the caller.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &UpstreamRequest,
    ) -> impl Future<Output = Result<String, SourceError>> + Send;
}

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// `User-Agent` header sent with every request
    pub user_agent: String,
    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl UpstreamConfig {
    pub fn new() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// reqwest-backed [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &UpstreamConfig) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|_| SourceError::NotConfigured("invalid user agent".to_string()))?;
        headers.insert(USER_AGENT, agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: &UpstreamRequest) -> Result<String, SourceError> {
        let timeout_secs = request.timeout.as_secs();
        let builder = match &request.method {
            RequestMethod::Get => self.http.get(&request.url),
            RequestMethod::Post(body) => self.http.post(&request.url).json(body),
        };

        let response = builder
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(e, timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::from_reqwest(e, timeout_secs))
    }
}
