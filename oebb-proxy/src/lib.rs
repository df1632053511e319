//! ÖBB departures proxy.
//!
//! Answers "when do the next trains leave?" for the two directions between
//! St. Pölten Hbf and Linz Hbf by querying a chain of upstream schedule
//! services and normalizing whatever the first working one returns.

pub mod chain;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod fallback;
pub mod normalize;
pub mod upstream;
pub mod web;
