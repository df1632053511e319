//! Per-source error types.

/// Why a single upstream source could not be used.
///
/// These never leave the source chain: each one is logged and the chain
/// moves on to the next source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network failure while sending or reading.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The per-request time bound elapsed.
    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Upstream answered with a non-2xx status.
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// Body was not the JSON we expected.
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Body decoded but had no journeys/routes (or mgate result) key.
    #[error("unrecognized payload: {0}")]
    Unrecognized(&'static str),

    /// The HTTP client could not be set up.
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl SourceError {
    /// Map a transport error, singling out timeouts.
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            SourceError::Timeout { secs: timeout_secs }
        } else {
            SourceError::Http(err)
        }
    }
}
