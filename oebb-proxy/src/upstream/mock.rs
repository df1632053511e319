//! Mock transport for testing without network access.
//!
//! Serves canned responses keyed by URL prefix and records every request it
//! receives, so tests can assert both on results and on which sources were
//! consulted.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Notify;

use super::client::{Transport, UpstreamRequest};
use super::error::SourceError;

/// What the mock answers for a matching request.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// 200 with this body.
    Body(String),
    /// Non-2xx status.
    Status(u16),
    /// The request's time bound elapses.
    Timeout,
}

impl MockResponse {
    pub fn json(value: serde_json::Value) -> Self {
        MockResponse::Body(value.to_string())
    }
}

/// Holds requests open until released, to exercise overlapping fetches.
#[derive(Debug, Clone, Default)]
pub struct Gate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

impl Gate {
    /// Wait until a request has reached the gate.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let one waiting request through.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

/// In-memory [`Transport`].
///
/// Requests whose URL matches no registered prefix get a 404.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    routes: Arc<Mutex<Vec<(String, MockResponse)>>>,
    requests: Arc<Mutex<Vec<UpstreamRequest>>>,
    gate: Option<Gate>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests whose URL starts with `prefix`. First match wins.
    pub fn respond(self, prefix: impl Into<String>, response: MockResponse) -> Self {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((prefix.into(), response));
        self
    }

    /// Hold every request at a gate until [`Gate::release`] is called.
    pub fn gated(mut self) -> (Self, Gate) {
        let gate = Gate::default();
        self.gate = Some(gate.clone());
        (self, gate)
    }

    /// All requests received so far, in order.
    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// URLs of all requests received so far, in order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }

    fn lookup(&self, url: &str) -> Option<MockResponse> {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            .map(|(_, response)| response.clone())
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: &UpstreamRequest) -> Result<String, SourceError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        match self.lookup(&request.url) {
            Some(MockResponse::Body(body)) => Ok(body),
            Some(MockResponse::Status(status)) => Err(SourceError::Status {
                status,
                message: String::new(),
            }),
            Some(MockResponse::Timeout) => Err(SourceError::Timeout {
                secs: request.timeout.as_secs(),
            }),
            None => Err(SourceError::Status {
                status: 404,
                message: format!("no mock response for {}", request.url),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn get(url: &str) -> UpstreamRequest {
        UpstreamRequest::get(url, Duration::from_secs(10))
    }

    #[tokio::test]
    async fn serves_by_prefix() {
        let mock = MockTransport::new()
            .respond("http://a/", MockResponse::Body("{}".into()))
            .respond("http://b/", MockResponse::Status(502))
            .respond("http://c/", MockResponse::Timeout);

        assert_eq!(mock.send(&get("http://a/journeys?x=1")).await.unwrap(), "{}");
        assert!(matches!(
            mock.send(&get("http://b/")).await,
            Err(SourceError::Status { status: 502, .. })
        ));
        assert!(matches!(
            mock.send(&get("http://c/")).await,
            Err(SourceError::Timeout { secs: 10 })
        ));
        assert!(matches!(
            mock.send(&get("http://d/")).await,
            Err(SourceError::Status { status: 404, .. })
        ));

        assert_eq!(mock.requested_urls().len(), 4);
    }

    #[tokio::test]
    async fn gate_holds_request() {
        let (mock, gate) = MockTransport::new()
            .respond("http://a/", MockResponse::Body("ok".into()))
            .gated();

        let task = tokio::spawn({
            let mock = mock.clone();
            async move { mock.send(&get("http://a/")).await }
        });

        gate.entered().await;
        assert!(!task.is_finished());
        gate.release();

        assert_eq!(task.await.unwrap().unwrap(), "ok");
    }
}
