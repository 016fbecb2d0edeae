//! Keyed snapshot cache with in-flight de-duplication
//!
//! Entries hold the last confirmed JSON snapshot of a resource. They are only
//! ever replaced wholesale: by a completed fetch or by a mutation response.
//!
//! Every key carries a generation number. Invalidating or overwriting a key
//! bumps it, so a fetch that started earlier is neither joined by later reads
//! nor allowed to overwrite the newer snapshot when it lands.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;
use tokio::time::{Duration, Instant};

use super::{KeyPattern, QueryOptions, QueryStatus, ResourceKey};
use crate::error::{ApiError, ApiResult};

/// Produces a fresh snapshot of one resource
pub type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, ApiResult<Value>> + Send + Sync>;

type SharedFetch = Shared<BoxFuture<'static, ApiResult<Value>>>;

/// Wrap a typed async API call as a [`Fetcher`].
pub fn fetcher<T, F, Fut>(f: F) -> Fetcher
where
    T: Serialize + Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<T>> + Send + 'static,
{
    Arc::new(move || {
        let request = f();
        async move {
            let data = request.await?;
            serde_json::to_value(data).map_err(|e| ApiError::InvalidResponse(e.to_string()))
        }
        .boxed()
    })
}

/// Deserialize a cached snapshot into its typed form
pub fn decode<T: DeserializeOwned>(key: &ResourceKey, value: Value) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|e| {
        ApiError::InvalidResponse(format!("Cached {} has unexpected shape: {}", key, e))
    })
}

/// Last confirmed snapshot for one key
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub data: Value,
    pub fetched_at: Instant,
    /// Set by invalidation; the next read refetches
    pub stale: bool,
}

impl CacheEntry {
    fn fresh(data: Value) -> Self {
        Self {
            data,
            fetched_at: Instant::now(),
            stale: false,
        }
    }

    /// Fresh means not invalidated and younger than `stale_after` (if any)
    pub fn is_fresh(&self, stale_after: Option<Duration>, now: Instant) -> bool {
        !self.stale && stale_after.is_none_or(|ttl| now.duration_since(self.fetched_at) < ttl)
    }

    pub fn age(&self) -> Duration {
        Instant::now().duration_since(self.fetched_at)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub stale_entries: usize,
    pub in_flight: usize,
    pub observed_keys: usize,
    pub fetches_started: u64,
}

struct InFlight {
    generation: u64,
    future: SharedFetch,
}

/// Observation bookkeeping for one key
struct KeyWatch {
    status: watch::Sender<QueryStatus>,
    fetcher: Option<Fetcher>,
    observers: usize,
    focus_observers: usize,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<ResourceKey, CacheEntry>,
    in_flight: HashMap<ResourceKey, InFlight>,
    generations: HashMap<ResourceKey, u64>,
    /// Generation of every key without an explicit one; raised by `clear`
    floor: u64,
    next_generation: u64,
    watches: HashMap<ResourceKey, KeyWatch>,
    fetches_started: u64,
}

impl CacheState {
    fn generation(&self, key: &ResourceKey) -> u64 {
        self.generations.get(key).copied().unwrap_or(self.floor)
    }

    fn bump(&mut self, key: &ResourceKey) {
        self.next_generation += 1;
        self.generations.insert(key.clone(), self.next_generation);
    }

    fn status(&self, key: &ResourceKey) -> Option<QueryStatus> {
        self.watches.get(key).map(|w| w.status.borrow().clone())
    }

    fn set_status(&self, key: &ResourceKey, status: QueryStatus) {
        if let Some(watch) = self.watches.get(key) {
            watch.status.send_replace(status);
        }
    }

    fn watch_mut(&mut self, key: &ResourceKey) -> &mut KeyWatch {
        let initial = match self.entries.get(key) {
            Some(entry) => QueryStatus::Ready(entry.data.clone()),
            None => QueryStatus::Idle,
        };
        self.watches.entry(key.clone()).or_insert_with(|| KeyWatch {
            status: watch::channel(initial).0,
            fetcher: None,
            observers: 0,
            focus_observers: 0,
        })
    }

    /// Record the outcome of the fetch started at `generation`
    fn complete(&mut self, key: &ResourceKey, generation: u64, result: &ApiResult<Value>) {
        if self
            .in_flight
            .get(key)
            .is_some_and(|f| f.generation == generation)
        {
            self.in_flight.remove(key);
        }

        if self.generation(key) != generation {
            debug!("Discarding superseded fetch: {}", key);
            return;
        }

        match result {
            Ok(data) => {
                self.entries
                    .insert(key.clone(), CacheEntry::fresh(data.clone()));
                self.set_status(key, QueryStatus::Ready(data.clone()));
            }
            Err(err) => {
                debug!("Fetch failed for {}: {}", key, err);
                let last = self.entries.get(key).map(|e| e.data.clone());
                self.set_status(
                    key,
                    QueryStatus::Error {
                        message: err.user_message(),
                        last,
                    },
                );
            }
        }
    }
}

/// Shared handle to the process-wide query cache.
///
/// Cloning is cheap; all clones see the same entries.
#[derive(Clone, Default)]
pub struct QueryCache {
    state: Arc<Mutex<CacheState>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return fresh cached data, or fetch (joining any in-flight fetch) and store it.
    ///
    /// A disabled query never fetches: it returns the last snapshot, or
    /// [`ApiError::Disabled`] when there is none.
    pub async fn get(
        &self,
        key: &ResourceKey,
        fetcher: &Fetcher,
        options: &QueryOptions,
    ) -> ApiResult<Value> {
        let pending = {
            let mut state = self.lock();
            if let Some(entry) = state.entries.get(key) {
                if !options.enabled || entry.is_fresh(options.stale_after, Instant::now()) {
                    debug!("Cache hit: {} ({:?} old)", key, entry.age());
                    return Ok(entry.data.clone());
                }
            } else if !options.enabled {
                return Err(ApiError::Disabled(key.to_string()));
            }
            self.join_or_start(&mut state, key, fetcher)
        };
        pending.await
    }

    /// Typed variant of [`get`](Self::get)
    pub async fn get_as<T: DeserializeOwned>(
        &self,
        key: &ResourceKey,
        fetcher: &Fetcher,
        options: &QueryOptions,
    ) -> ApiResult<T> {
        let value = self.get(key, fetcher, options).await?;
        decode(key, value)
    }

    /// Fetch regardless of freshness (still joins a current in-flight fetch)
    pub async fn refetch(&self, key: &ResourceKey, fetcher: &Fetcher) -> ApiResult<Value> {
        let pending = {
            let mut state = self.lock();
            self.join_or_start(&mut state, key, fetcher)
        };
        pending.await
    }

    /// Start a background refetch without waiting for it
    pub(crate) fn spawn_refetch(&self, key: &ResourceKey, fetcher: &Fetcher) {
        let mut state = self.lock();
        let _ = self.join_or_start(&mut state, key, fetcher);
    }

    /// Fetch on mount unless the cached snapshot is still fresh
    pub(crate) fn mount(&self, key: &ResourceKey, fetcher: &Fetcher, options: &QueryOptions) {
        let mut state = self.lock();
        let fresh = state
            .entries
            .get(key)
            .filter(|e| e.is_fresh(options.stale_after, Instant::now()))
            .map(|e| e.data.clone());
        match fresh {
            Some(data) => {
                if !matches!(state.status(key), Some(QueryStatus::Ready(_))) {
                    state.set_status(key, QueryStatus::Ready(data));
                }
            }
            None => {
                let _ = self.join_or_start(&mut state, key, fetcher);
            }
        }
    }

    fn join_or_start(
        &self,
        state: &mut CacheState,
        key: &ResourceKey,
        fetcher: &Fetcher,
    ) -> SharedFetch {
        let generation = state.generation(key);
        if let Some(flight) = state.in_flight.get(key)
            && flight.generation == generation
        {
            debug!("Joining in-flight fetch: {}", key);
            return flight.future.clone();
        }

        debug!("Fetching: {}", key);
        let next = match (state.status(key), state.entries.get(key)) {
            (Some(QueryStatus::Error { .. }), _) | (_, None) => QueryStatus::Loading,
            (_, Some(entry)) => QueryStatus::Refetching(entry.data.clone()),
        };
        state.set_status(key, next);
        state.fetches_started += 1;

        // The request runs as its own task so that callers losing interest never cancel it
        let shared_state = Arc::clone(&self.state);
        let task_key = key.clone();
        let request = fetcher();
        let handle = tokio::spawn(async move {
            let result = request.await;
            shared_state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .complete(&task_key, generation, &result);
            result
        });

        let future = async move {
            handle
                .await
                .unwrap_or_else(|e| Err(ApiError::Transport(format!("Fetch task failed: {}", e))))
        }
        .boxed()
        .shared();

        state.in_flight.insert(
            key.clone(),
            InFlight {
                generation,
                future: future.clone(),
            },
        );
        future
    }

    /// Mark every matching entry stale and refetch the observed ones.
    ///
    /// Returns the number of keys affected.
    pub fn invalidate(&self, pattern: &KeyPattern) -> usize {
        let mut state = self.lock();
        let keys: BTreeSet<ResourceKey> = state
            .entries
            .keys()
            .chain(state.in_flight.keys())
            .chain(state.watches.keys())
            .filter(|k| pattern.matches(k))
            .cloned()
            .collect();

        for key in &keys {
            if let Some(entry) = state.entries.get_mut(key) {
                entry.stale = true;
            }
            state.bump(key);
        }

        let observed: Vec<(ResourceKey, Fetcher)> = keys
            .iter()
            .filter_map(|key| {
                let watch = state.watches.get(key).filter(|w| w.observers > 0)?;
                watch.fetcher.clone().map(|f| (key.clone(), f))
            })
            .collect();

        debug!(
            "Invalidated {}: {} keys, {} refetching",
            pattern,
            keys.len(),
            observed.len()
        );

        for (key, fetcher) in &observed {
            let _ = self.join_or_start(&mut state, key, fetcher);
        }

        keys.len()
    }

    /// Replace an entry wholesale with confirmed data
    pub fn set(&self, key: &ResourceKey, data: Value) {
        let mut state = self.lock();
        state.bump(key);
        state.set_status(key, QueryStatus::Ready(data.clone()));
        state.entries.insert(key.clone(), CacheEntry::fresh(data));
        debug!("Cache set: {}", key);
    }

    /// Typed variant of [`set`](Self::set)
    pub fn set_as<T: Serialize>(&self, key: &ResourceKey, data: &T) -> ApiResult<()> {
        let value =
            serde_json::to_value(data).map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        self.set(key, value);
        Ok(())
    }

    /// Current entry for a key, fresh or not
    pub fn peek(&self, key: &ResourceKey) -> Option<CacheEntry> {
        self.lock().entries.get(key).cloned()
    }

    pub fn peek_as<T: DeserializeOwned>(&self, key: &ResourceKey) -> Option<T> {
        let entry = self.peek(key)?;
        decode(key, entry.data).ok()
    }

    /// Drop matching entries entirely
    #[allow(dead_code)]
    pub fn remove(&self, pattern: &KeyPattern) -> usize {
        let mut state = self.lock();
        let keys: Vec<ResourceKey> = state
            .entries
            .keys()
            .filter(|k| pattern.matches(k))
            .cloned()
            .collect();
        for key in &keys {
            state.entries.remove(key);
            state.bump(key);
            state.set_status(key, QueryStatus::Idle);
        }
        keys.len()
    }

    /// Forget everything (logout)
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.in_flight.clear();
        state.generations.clear();
        state.next_generation += 1;
        state.floor = state.next_generation;
        for watch in state.watches.values() {
            watch.status.send_replace(QueryStatus::Idle);
        }
        debug!("Cache cleared");
    }

    /// Refetch observed keys that asked for it when the view regains focus
    pub fn notify_focus(&self) -> usize {
        let mut state = self.lock();
        let targets: Vec<(ResourceKey, Fetcher)> = state
            .watches
            .iter()
            .filter(|(_, w)| w.observers > 0 && w.focus_observers > 0)
            .filter_map(|(k, w)| w.fetcher.clone().map(|f| (k.clone(), f)))
            .collect();
        for (key, fetcher) in &targets {
            let _ = self.join_or_start(&mut state, key, fetcher);
        }
        targets.len()
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            entries: state.entries.len(),
            stale_entries: state.entries.values().filter(|e| e.stale).count(),
            in_flight: state.in_flight.len(),
            observed_keys: state.watches.values().filter(|w| w.observers > 0).count(),
            fetches_started: state.fetches_started,
        }
    }

    pub(crate) fn subscribe(&self, key: &ResourceKey) -> watch::Receiver<QueryStatus> {
        self.lock().watch_mut(key).status.subscribe()
    }

    pub(crate) fn register_observer(&self, key: &ResourceKey, fetcher: &Fetcher, on_focus: bool) {
        let mut state = self.lock();
        let watch = state.watch_mut(key);
        watch.fetcher = Some(Arc::clone(fetcher));
        watch.observers += 1;
        if on_focus {
            watch.focus_observers += 1;
        }
    }

    /// Forget the watch of a key nobody observes or subscribes to anymore
    pub(crate) fn prune_watch(&self, key: &ResourceKey) {
        let mut state = self.lock();
        let unused = state
            .watches
            .get(key)
            .is_some_and(|w| w.observers == 0 && w.status.receiver_count() == 0);
        if unused {
            state.watches.remove(key);
            debug!("Released watch: {}", key);
        }
    }

    pub(crate) fn unregister_observer(&self, key: &ResourceKey, on_focus: bool) {
        let mut state = self.lock();
        if let Some(watch) = state.watches.get_mut(key) {
            watch.observers = watch.observers.saturating_sub(1);
            if on_focus {
                watch.focus_observers = watch.focus_observers.saturating_sub(1);
            }
        }
    }
}
