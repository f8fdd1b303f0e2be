//! Keyed read cache with single-flight fetches and stale-while-revalidate.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use entigate_common::error::ClassifiedError;
use entigate_common::resilience::policies::ClassifiedRetry;
use entigate_common::resilience::{
    retry_with_policy, BackoffStrategy, Clock, RetryConfig, RetryError, SystemClock,
};
use entigate_domain::{QueryConfig, QueryStatus};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::key::QueryKey;

type FetchResult<T> = Result<T, ClassifiedError>;
type SharedFetch<T> = Shared<BoxFuture<'static, FetchResult<T>>>;

/// Freshness and retry policy applied to every read
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPolicy {
    /// How long a successful fetch is served without revalidation.
    pub stale_time: Duration,
    /// Attempts and backoff for retryable fetch failures.
    pub retry: RetryConfig,
}

impl QueryPolicy {
    /// Policy from configuration values.
    pub fn from_config(config: &QueryConfig) -> Self {
        Self {
            stale_time: config.stale_time(),
            retry: RetryConfig::with_retries(
                config.retry_count,
                BackoffStrategy::doubling(config.retry_base(), config.retry_max()),
            ),
        }
    }
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self::from_config(&QueryConfig::default())
    }
}

/// Snapshot of one cached key
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// Key this entry is stored under.
    pub key: QueryKey,
    /// Last successfully fetched or written value.
    pub data: Option<T>,
    /// When `data` was stored; drives staleness.
    pub fetched_at: Option<Instant>,
    /// Outcome of the latest fetch.
    pub status: QueryStatus,
    /// Last fetch error; cleared by the next successful write.
    pub error: Option<ClassifiedError>,
    /// Marked stale explicitly, regardless of `fetched_at`.
    pub invalidated: bool,
}

impl<T> CacheEntry<T> {
    fn empty(key: QueryKey) -> Self {
        Self {
            key,
            data: None,
            fetched_at: None,
            status: QueryStatus::Idle,
            error: None,
            invalidated: false,
        }
    }

    fn is_stale_at(&self, now: Instant, stale_time: Duration) -> bool {
        if self.invalidated || self.data.is_none() {
            return true;
        }
        self.fetched_at.map_or(true, |at| now.saturating_duration_since(at) >= stale_time)
    }

    fn store(&mut self, data: T, now: Instant) {
        self.data = Some(data);
        self.fetched_at = Some(now);
        self.status = QueryStatus::Success;
        self.error = None;
        self.invalidated = false;
    }
}

struct InFlight<T> {
    seq: u64,
    future: SharedFetch<T>,
}

struct State<T> {
    entries: HashMap<QueryKey, CacheEntry<T>>,
    /// Fetch new readers of a key join.
    in_flight: HashMap<QueryKey, InFlight<T>>,
    /// Fetches per key that have not completed, joinable or not.
    running: HashMap<QueryKey, usize>,
    /// Sequence number of the last write to a key with running fetches.
    touched: HashMap<QueryKey, u64>,
    seq: u64,
}

impl<T> State<T> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            in_flight: HashMap::new(),
            running: HashMap::new(),
            touched: HashMap::new(),
            seq: 0,
        }
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    /// Record a direct write so fetches already running for `key` cannot
    /// overwrite it, and make the next reader start a new fetch.
    fn touch(&mut self, key: &QueryKey) {
        let seq = self.next_seq();
        if self.running.contains_key(key) {
            self.touched.insert(key.clone(), seq);
            self.in_flight.remove(key);
        }
    }

    fn matching_keys(&self, prefix: &QueryKey) -> Vec<QueryKey> {
        self.entries.keys().filter(|key| key.starts_with(prefix)).cloned().collect()
    }
}

struct Inner<T, C> {
    policy: QueryPolicy,
    clock: C,
    state: Mutex<State<T>>,
}

impl<T, C> Inner<T, C>
where
    T: Clone,
    C: Clock,
{
    fn complete(&self, key: QueryKey, seq: u64, result: &FetchResult<T>) {
        let now = self.clock.now();
        let mut state = self.state.lock();

        if state.in_flight.get(&key).is_some_and(|fetch| fetch.seq == seq) {
            state.in_flight.remove(&key);
        }
        let overtaken = state.touched.get(&key).is_some_and(|&touched| touched > seq);
        let finished = match state.running.get_mut(&key) {
            Some(count) => {
                *count = count.saturating_sub(1);
                *count == 0
            }
            None => true,
        };
        if finished {
            state.running.remove(&key);
            state.touched.remove(&key);
        }

        if overtaken {
            let refetching = state.in_flight.contains_key(&key);
            if let Some(entry) = state.entries.get_mut(&key) {
                entry.invalidated = true;
                if entry.status == QueryStatus::Pending && !refetching {
                    entry.status = if entry.data.is_some() {
                        QueryStatus::Success
                    } else {
                        QueryStatus::Idle
                    };
                }
            }
            debug!(key = %key, "discarding fetch result overtaken by a cache write");
            return;
        }

        let entry =
            state.entries.entry(key.clone()).or_insert_with(|| CacheEntry::empty(key.clone()));
        match result {
            Ok(data) => {
                entry.store(data.clone(), now);
                debug!(key = %key, "query succeeded");
            }
            Err(error) => {
                entry.status = QueryStatus::Error;
                entry.error = Some(error.clone());
                warn!(
                    key = %key,
                    status_code = error.status_code(),
                    error_code = error.error_code(),
                    detail = error.detail().unwrap_or_default(),
                    "query_failed"
                );
            }
        }
    }
}

/// Keyed cache of server state
///
/// Cloning is cheap; clones share the same entries. All entry access goes
/// through one mutex that is never held across an `.await`.
///
/// # Type Parameters
///
/// * `T` - Cached value type
/// * `C` - Clock type for freshness checks (defaults to `SystemClock`)
pub struct QueryCache<T, C = SystemClock> {
    inner: Arc<Inner<T, C>>,
}

impl<T, C> Clone for QueryCache<T, C> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T> QueryCache<T, SystemClock>
where
    T: Clone + Send + Sync + 'static,
{
    /// Empty cache on the system clock.
    pub fn new(policy: QueryPolicy) -> Self {
        Self::with_clock(policy, SystemClock)
    }
}

impl<T, C> QueryCache<T, C>
where
    T: Clone + Send + Sync + 'static,
    C: Clock,
{
    /// Empty cache driven by `clock`.
    pub fn with_clock(policy: QueryPolicy, clock: C) -> Self {
        Self { inner: Arc::new(Inner { policy, clock, state: Mutex::new(State::new()) }) }
    }

    /// Freshness and retry policy of this cache.
    pub fn policy(&self) -> &QueryPolicy {
        &self.inner.policy
    }

    /// Read `key`, fetching it when needed.
    ///
    /// - fresh entry: returned without calling `fetch`
    /// - stale entry with data: the old data is returned and a background
    ///   refetch is started
    /// - no data: the caller waits for the fetch; concurrent callers share it
    ///
    /// The fetch runs on its own task, so dropping the returned future does
    /// not cancel it and its result is still stored.
    ///
    /// # Errors
    ///
    /// The classified error of the last fetch attempt. Only retryable errors
    /// are retried, within the policy's attempt budget.
    pub async fn query<F, Fut>(&self, key: QueryKey, fetch: F) -> FetchResult<T>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FetchResult<T>> + Send + 'static,
    {
        let pending = {
            let now = self.inner.clock.now();
            let mut state = self.inner.state.lock();
            let (cached, fresh) = match state.entries.get(&key) {
                Some(entry) => {
                    (entry.data.clone(), !entry.is_stale_at(now, self.inner.policy.stale_time))
                }
                None => (None, false),
            };

            match cached {
                Some(data) if fresh => return Ok(data),
                Some(data) => {
                    debug!(key = %key, "serving stale entry, revalidating");
                    let _background = self.start_fetch(&mut state, key, fetch);
                    return Ok(data);
                }
                None => self.start_fetch(&mut state, key, fetch),
            }
        };
        pending.await
    }

    /// Fetch `key` regardless of freshness, joining a fetch already running.
    ///
    /// # Errors
    ///
    /// Same as [`QueryCache::query`].
    pub async fn refetch<F, Fut>(&self, key: QueryKey, fetch: F) -> FetchResult<T>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FetchResult<T>> + Send + 'static,
    {
        let pending = {
            let mut state = self.inner.state.lock();
            self.start_fetch(&mut state, key, fetch)
        };
        pending.await
    }

    fn start_fetch<F, Fut>(&self, state: &mut State<T>, key: QueryKey, fetch: F) -> SharedFetch<T>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FetchResult<T>> + Send + 'static,
    {
        if let Some(in_flight) = state.in_flight.get(&key) {
            debug!(key = %key, "joining in-flight fetch");
            return in_flight.future.clone();
        }

        let seq = state.next_seq();
        *state.running.entry(key.clone()).or_insert(0) += 1;
        state.entries.entry(key.clone()).or_insert_with(|| CacheEntry::empty(key.clone())).status =
            QueryStatus::Pending;

        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let task = tokio::spawn(async move {
            let result = retry_with_policy(&inner.policy.retry, &ClassifiedRetry, || fetch())
                .await
                .map_err(RetryError::into_source);
            inner.complete(task_key, seq, &result);
            result
        });

        let future = async move {
            task.await.unwrap_or_else(|err| {
                Err(ClassifiedError::internal(format!("fetch task failed: {err}")))
            })
        }
        .boxed()
        .shared();

        debug!(key = %key, seq, "fetch started");
        state.in_flight.insert(key, InFlight { seq, future: future.clone() });
        future
    }

    /// Snapshot of the entry for `key`.
    pub fn peek(&self, key: &QueryKey) -> Option<CacheEntry<T>> {
        self.inner.state.lock().entries.get(key).cloned()
    }

    /// Cached value for `key`, stale or not.
    pub fn get_data(&self, key: &QueryKey) -> Option<T> {
        self.inner.state.lock().entries.get(key).and_then(|entry| entry.data.clone())
    }

    /// Write `key` as if it had just been fetched.
    ///
    /// `updater` sees the current data and returns the replacement; `None`
    /// leaves the entry untouched. It runs under the cache lock and must not
    /// call back into the cache. Returns whether anything was written.
    pub fn set_data<F>(&self, key: &QueryKey, updater: F) -> bool
    where
        F: FnOnce(Option<&T>) -> Option<T>,
    {
        let now = self.inner.clock.now();
        let mut state = self.inner.state.lock();

        let current = state.entries.get(key).and_then(|entry| entry.data.as_ref());
        let Some(data) = updater(current) else {
            return false;
        };

        state.touch(key);
        state
            .entries
            .entry(key.clone())
            .or_insert_with(|| CacheEntry::empty(key.clone()))
            .store(data, now);
        true
    }

    /// Rewrite the data of every entry under `prefix` that has data.
    ///
    /// Freshness is left as is. Returns the number of entries rewritten.
    pub fn update_matching<F>(&self, prefix: &QueryKey, mut update: F) -> usize
    where
        F: FnMut(&T) -> T,
    {
        let mut state = self.inner.state.lock();
        let mut updated = 0;

        for key in state.matching_keys(prefix) {
            let Some(data) = state.entries.get_mut(&key).and_then(|entry| entry.data.as_mut())
            else {
                continue;
            };
            let next = update(data);
            *data = next;
            state.touch(&key);
            updated += 1;
        }
        updated
    }

    /// Drop `key`; a fetch still running for it will not bring it back.
    pub fn remove(&self, key: &QueryKey) -> Option<CacheEntry<T>> {
        let mut state = self.inner.state.lock();
        state.touch(key);
        state.entries.remove(key)
    }

    /// Drop every entry under `prefix`. Returns the number removed.
    pub fn remove_matching(&self, prefix: &QueryKey) -> usize {
        let mut state = self.inner.state.lock();
        let keys = state.matching_keys(prefix);
        for key in &keys {
            state.touch(key);
            state.entries.remove(key);
        }
        keys.len()
    }

    /// Mark every entry under `prefix` stale so the next read revalidates.
    ///
    /// Returns the number of entries marked.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut state = self.inner.state.lock();
        let keys = state.matching_keys(prefix);
        for key in &keys {
            state.touch(key);
            if let Some(entry) = state.entries.get_mut(key) {
                entry.invalidated = true;
            }
        }
        debug!(prefix = %prefix, count = keys.len(), "invalidated cache entries");
        keys.len()
    }

    /// Whether a read of `key` would hit the network. Absent keys are stale.
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        let now = self.inner.clock.now();
        self.inner
            .state
            .lock()
            .entries
            .get(key)
            .map_or(true, |entry| entry.is_stale_at(now, self.inner.policy.stale_time))
    }

    /// Every key currently stored.
    pub fn keys(&self) -> Vec<QueryKey> {
        self.inner.state.lock().entries.keys().cloned().collect()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.inner.state.lock().entries.len()
    }

    /// Whether no entry is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
