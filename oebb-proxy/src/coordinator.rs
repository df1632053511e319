//! Per-direction fetch coordination.
//!
//! At most one fetch per direction runs at a time. A second request for a
//! direction that is already being fetched fails immediately with
//! [`FetchError::Busy`] instead of queueing behind the first.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::chain::{RouteConfig, SourceChain};
use crate::domain::{Instant, RouteDirection, TrainDeparture, vienna_now};
use crate::normalize::into_departures;
use crate::upstream::Transport;

/// Errors that reach the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Another fetch for this direction has not finished yet.
    #[error("API call in progress - please wait")]
    Busy { direction: RouteDirection },

    /// Every source failed or answered with an unrecognizable payload.
    #[error("All APIs failed")]
    AllSourcesExhausted {
        direction: RouteDirection,
        attempted: Vec<String>,
    },
}

impl FetchError {
    pub fn direction(&self) -> RouteDirection {
        match self {
            FetchError::Busy { direction } | FetchError::AllSourcesExhausted { direction, .. } => {
                *direction
            }
        }
    }
}

/// Departures for one direction and the source that supplied them.
///
/// An empty `trains` list is still a success.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub source: String,
    pub trains: Vec<TrainDeparture>,
}

/// Marks a direction as in flight until dropped.
struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Runs the source chain for a direction, one fetch at a time.
pub struct FetchCoordinator<T> {
    chain: SourceChain<T>,
    routes: HashMap<RouteDirection, RouteConfig>,
    in_flight: [AtomicBool; 2],
}

impl<T: Transport> FetchCoordinator<T> {
    pub fn new(chain: SourceChain<T>, routes: impl IntoIterator<Item = RouteConfig>) -> Self {
        Self {
            chain,
            routes: routes.into_iter().map(|r| (r.direction, r)).collect(),
            in_flight: [AtomicBool::new(false), AtomicBool::new(false)],
        }
    }

    pub fn is_in_flight(&self, direction: RouteDirection) -> bool {
        self.in_flight[direction.index()].load(Ordering::Acquire)
    }

    /// Fetch the next departures for `direction` as of now.
    pub async fn fetch(&self, direction: RouteDirection) -> Result<FetchOutcome, FetchError> {
        self.fetch_at(direction, vienna_now()).await
    }

    /// Fetch the next departures for `direction` as of `now`.
    pub async fn fetch_at(
        &self,
        direction: RouteDirection,
        now: Instant,
    ) -> Result<FetchOutcome, FetchError> {
        let Some(_guard) = FlightGuard::acquire(&self.in_flight[direction.index()]) else {
            warn!(%direction, "rejecting fetch, another is in flight");
            return Err(FetchError::Busy { direction });
        };

        let Some(route) = self.routes.get(&direction) else {
            warn!(%direction, "no route configured");
            return Err(FetchError::AllSourcesExhausted {
                direction,
                attempted: Vec::new(),
            });
        };

        let outcome = self.chain.run(route, &now).await.map_err(|e| {
            warn!(%direction, error = %e, "no source produced a usable answer");
            FetchError::AllSourcesExhausted {
                direction,
                attempted: e.attempted,
            }
        })?;

        let trains = into_departures(outcome.candidates);
        info!(%direction, source = %outcome.source, count = trains.len(), "fetch complete");

        Ok(FetchOutcome {
            source: outcome.source,
            trains,
        })
    }
}
