//! Application state for the web layer.

use std::sync::Arc;

use crate::config::FallbackPolicy;
use crate::coordinator::FetchCoordinator;
use crate::upstream::Transport;

/// Shared application state.
pub struct AppState<T> {
    /// Per-direction fetch coordinator
    pub coordinator: Arc<FetchCoordinator<T>>,

    /// What to serve when every source fails
    pub fallback: FallbackPolicy,
}

impl<T: Transport> AppState<T> {
    pub fn new(coordinator: FetchCoordinator<T>, fallback: FallbackPolicy) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
            fallback,
        }
    }
}

// Manual impl: `T` itself need not be `Clone`.
impl<T> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            coordinator: Arc::clone(&self.coordinator),
            fallback: self.fallback,
        }
    }
}
