//! Live subscriptions to cached queries

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::query::decode;
use super::{Fetcher, QueryCache, QueryOptions, ResourceKey};
use crate::error::ApiResult;

/// Observable state of one query
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QueryStatus {
    /// Nothing fetched yet (or disabled with no snapshot)
    #[default]
    Idle,
    /// First fetch in progress, no data to show
    Loading,
    Ready(Value),
    /// Background refetch while the previous snapshot stays visible
    Refetching(Value),
    /// Fetch failed; `last` is the snapshot from before the failure, if any
    Error { message: String, last: Option<Value> },
}

impl QueryStatus {
    /// Not waiting on a request
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            QueryStatus::Idle | QueryStatus::Ready(_) | QueryStatus::Error { .. }
        )
    }

    /// Latest data to render, if any
    pub fn data(&self) -> Option<&Value> {
        match self {
            QueryStatus::Ready(v) | QueryStatus::Refetching(v) => Some(v),
            QueryStatus::Error { last, .. } => last.as_ref(),
            QueryStatus::Idle | QueryStatus::Loading => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            QueryStatus::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// A mounted view of one key.
///
/// While alive it counts as an observer: invalidations refetch the key,
/// polling runs at the configured cadence and focus events refetch it when
/// asked for. Dropping the observer stops all of that.
pub struct QueryObserver {
    cache: QueryCache,
    key: ResourceKey,
    fetcher: Fetcher,
    options: QueryOptions,
    status: watch::Receiver<QueryStatus>,
    poller: Option<JoinHandle<()>>,
    registered: bool,
}

impl QueryCache {
    /// Mount an observer for `key`. Fetches right away unless the snapshot is fresh.
    pub fn observe(
        &self,
        key: ResourceKey,
        fetcher: Fetcher,
        options: QueryOptions,
    ) -> QueryObserver {
        let status = self.subscribe(&key);
        let mut observer = QueryObserver {
            cache: self.clone(),
            key,
            fetcher,
            options,
            status,
            poller: None,
            registered: false,
        };
        if options.enabled {
            observer.activate();
        }
        observer
    }
}

impl QueryObserver {
    fn activate(&mut self) {
        if self.registered {
            return;
        }
        self.cache
            .register_observer(&self.key, &self.fetcher, self.options.refetch_on_focus);
        self.registered = true;
        self.cache.mount(&self.key, &self.fetcher, &self.options);

        if let Some(period) = self.options.poll_interval {
            let cache = self.cache.clone();
            let key = self.key.clone();
            let fetcher = Arc::clone(&self.fetcher);
            self.poller = Some(tokio::spawn(async move {
                let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
                ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticks.tick().await;
                    log::debug!("Polling {}", key);
                    cache.spawn_refetch(&key, &fetcher);
                }
            }));
        }
    }

    fn deactivate(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
        if self.registered {
            self.cache
                .unregister_observer(&self.key, self.options.refetch_on_focus);
            self.registered = false;
        }
    }

    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// Current status snapshot
    pub fn status(&self) -> QueryStatus {
        self.status.borrow().clone()
    }

    /// Latest data decoded into its typed form
    #[allow(dead_code)]
    pub fn data<T: DeserializeOwned>(&self) -> Option<ApiResult<T>> {
        let value = self.status.borrow().data().cloned()?;
        Some(decode(&self.key, value))
    }

    /// Wait for the next status change. Returns `None` once the cache is gone.
    pub async fn changed(&mut self) -> Option<QueryStatus> {
        self.status.changed().await.ok()?;
        Some(self.status.borrow_and_update().clone())
    }

    /// Wait until no request is pending for this key
    pub async fn settled(&mut self) -> QueryStatus {
        if let Ok(s) = self.status.wait_for(QueryStatus::is_settled).await {
            return s.clone();
        }
        self.status()
    }

    /// Force a refetch (joins a current in-flight fetch)
    pub async fn refetch(&self) -> ApiResult<Value> {
        self.cache.refetch(&self.key, &self.fetcher).await
    }

    /// Retry after an error; the status goes back to `Loading` first
    pub async fn retry(&self) -> ApiResult<Value> {
        self.refetch().await
    }

    /// Toggle the precondition gate. Enabling mounts the query.
    #[allow(dead_code)]
    pub fn set_enabled(&mut self, enabled: bool) {
        self.options.enabled = enabled;
        if enabled {
            self.activate();
        } else {
            self.deactivate();
        }
    }
}

impl Drop for QueryObserver {
    fn drop(&mut self) {
        self.deactivate();
        // Release our receiver first so an unwatched key can be pruned
        let (_, detached) = watch::channel(QueryStatus::Idle);
        drop(std::mem::replace(&mut self.status, detached));
        self.cache.prune_watch(&self.key);
    }
}
