//! Web layer for the departures proxy.
//!
//! Serves the departure envelopes per direction plus a service description
//! and a health check.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
