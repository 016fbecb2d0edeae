//! In-memory query cache for API responses
//!
//! Keyed snapshots of server resources with staleness windows, explicit
//! invalidation, in-flight de-duplication and observers that refetch in the
//! background. One cache instance is created per process and injected into
//! the command context; it is cleared on logout.

pub mod key;
pub mod observer;
pub mod query;

use std::time::Duration;

/// Freshness windows per resource
///
/// Reads younger than these windows are served from the cache without a request.
pub struct StaleAfter;

impl StaleAfter {
    // Task data - lists change as teammates work
    pub const TASKS: Duration = Duration::from_secs(30);
    pub const TASK_DETAIL: Duration = Duration::from_secs(30);
    pub const DASHBOARD: Duration = Duration::from_secs(60);

    // Chat - users are stable, conversations are polled
    pub const CHAT_USERS: Duration = Duration::from_secs(5 * 60);
    pub const MESSAGES: Duration = Duration::from_secs(5);

    pub const DOCUMENTS: Duration = Duration::from_secs(2 * 60);
}

/// Per-query fetch policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Max age before a read triggers a refetch; `None` keeps data fresh until invalidated
    pub stale_after: Option<Duration>,
    /// Background refetch cadence while observed
    pub poll_interval: Option<Duration>,
    /// Refetch when the view regains focus
    pub refetch_on_focus: bool,
    /// Suppress fetching until a precondition holds
    pub enabled: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_after: None,
            poll_interval: None,
            refetch_on_focus: false,
            enabled: true,
        }
    }
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stale_after(mut self, ttl: Duration) -> Self {
        self.stale_after = Some(ttl);
        self
    }

    pub fn poll_every(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn refetch_on_focus(mut self) -> Self {
        self.refetch_on_focus = true;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

// Re-export main types
pub use key::{KeyPattern, ResourceKey, resource};
pub use observer::{QueryObserver, QueryStatus};
pub use query::{Fetcher, QueryCache, fetcher};
