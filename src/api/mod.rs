//! REST client for the panel's server.
//!
//! Every call is prefixed with the configured API base and decoded from JSON.
//! Failures are surfaced immediately, without retries; callers decide what
//! the user gets to see.

mod client;
mod error;
mod resource;
mod stats;

pub use client::ApiClient;
pub use error::ApiError;
pub use resource::Resource;
pub use stats::{DashboardStats, StatCounters, TopProduct, STATS_PATH};
