//! Per-endpoint rate limiting for the dashboard API
//!
//! Pacing starts for an endpoint group only after it receives a 429. The
//! request that got the 429 is not retried.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use tokio::sync::RwLock;

/// Groups of API endpoints sharing a rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointCategory {
    /// /api/tasks* - 10 req/sec
    Tasks,
    /// /api/messages* - 10 req/sec
    Messages,
    /// /api/documents* - 5 req/sec
    Documents,
    /// /api/reportsTask/export* - 2 req/min
    Reports,
    /// Everything else - 5 req/sec
    Default,
}

impl EndpointCategory {
    /// Categorize a request by its path (without the host).
    pub fn from_path(path: &str) -> Self {
        let path = path.strip_prefix("/api").unwrap_or(path);

        if path.starts_with("/reportsTask/export") {
            EndpointCategory::Reports
        } else if path.starts_with("/tasks") {
            EndpointCategory::Tasks
        } else if path.starts_with("/messages") {
            EndpointCategory::Messages
        } else if path.starts_with("/documents") {
            EndpointCategory::Documents
        } else {
            EndpointCategory::Default
        }
    }

    /// Pace applied once the category has been rate limited
    pub fn quota(self) -> Quota {
        match self {
            EndpointCategory::Tasks | EndpointCategory::Messages => Quota::per_second(nonzero(10)),
            EndpointCategory::Documents | EndpointCategory::Default => {
                Quota::per_second(nonzero(5))
            }
            EndpointCategory::Reports => Quota::per_minute(nonzero(2)),
        }
    }
}

fn nonzero(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN)
}

type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Limiters for the categories that have seen a 429, created on first use
#[derive(Default)]
pub struct RateLimiterSet {
    active: RwLock<HashMap<EndpointCategory, Arc<Limiter>>>,
}

impl RateLimiterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for a slot; returns at once for categories never limited
    pub async fn wait_for(&self, category: EndpointCategory) {
        // Clone out so other categories are not blocked while this one waits
        let limiter = self.active.read().await.get(&category).cloned();
        if let Some(limiter) = limiter {
            debug!("Pacing {:?} request", category);
            limiter.until_ready().await;
        }
    }

    /// Start pacing a category. Repeated 429s keep the existing limiter.
    pub async fn activate(&self, category: EndpointCategory) {
        self.active
            .write()
            .await
            .entry(category)
            .or_insert_with(|| {
                debug!("Rate limiting activated for {:?}", category);
                Arc::new(RateLimiter::direct(category.quota()))
            });
    }

    #[cfg(test)]
    pub async fn is_active(&self, category: EndpointCategory) -> bool {
        self.active.read().await.contains_key(&category)
    }
}
