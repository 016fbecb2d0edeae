//! Dashboard API client
//!
//! The remote resource layer: one HTTP client implementing the per-resource
//! API traits, plus an in-memory mock for tests.

pub mod api;
pub mod dashboard;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod rate_limit;

pub use api::{DocumentApi, MessageApi, TaskApi};
pub use dashboard::DashboardClient;
#[cfg(test)]
pub use mock::MockDashboardClient;

/// Complete dashboard API surface.
///
/// Implemented automatically for anything that implements every sub-trait.
pub trait DashboardApi: TaskApi + MessageApi + DocumentApi {}

impl<T: TaskApi + MessageApi + DocumentApi> DashboardApi for T {}
