//! Polling data cache
//!
//! Generic "refresh on an interval, keep the last good value" cache used for
//! live transcripts, complete transcripts, and the conversation list. Each
//! key gets its own polling task while enabled. Results are ordered by
//! issuance: a fetch that completes after a newer fetch has already applied
//! is discarded, so out-of-order arrivals can never roll the visible value
//! backwards. A failed fetch keeps the stale value and only raises the error
//! flag.
//!
//! Polls do not run forever: a key nobody has snapshotted within the idle
//! TTL stops polling and releases its entry. Readers re-enable the key on
//! their next request, so an expired poll costs one stale snapshot at worst.

use crate::backend::BackendError;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// What the presentation layer sees for one key.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSnapshot<V> {
    /// Most recent successfully fetched value, if any.
    pub data: Option<V>,
    /// A fetch newer than the applied one is outstanding.
    pub is_loading: bool,
    /// The most recently applied fetch failed.
    pub is_error: bool,
}

impl<V> Default for CacheSnapshot<V> {
    fn default() -> Self {
        Self {
            data: None,
            is_loading: false,
            is_error: false,
        }
    }
}

#[derive(Debug)]
struct Entry<V> {
    data: Option<V>,
    is_error: bool,
    /// Sequence of the newest issued fetch.
    issued_seq: u64,
    /// Sequence of the newest fetch whose result was applied.
    applied_seq: u64,
    /// When a reader last snapshotted this key.
    last_read: Instant,
}

impl<V> Entry<V> {
    fn new() -> Self {
        Self {
            data: None,
            is_error: false,
            issued_seq: 0,
            applied_seq: 0,
            last_read: Instant::now(),
        }
    }
}

/// Periodic-refresh cache keyed by `K`.
pub struct PollingCache<K, V> {
    entries: Arc<RwLock<HashMap<K, Entry<V>>>>,
    tasks: Mutex<HashMap<K, JoinHandle<()>>>,
    interval: Duration,
    idle_ttl: Duration,
}

impl<K, V> PollingCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + std::fmt::Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(interval: Duration, idle_ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            tasks: Mutex::new(HashMap::new()),
            interval,
            idle_ttl,
        }
    }

    /// Start polling `key`: one fetch immediately, then one per interval
    /// until `disable` is called or no reader snapshots the key within the
    /// idle TTL. Enabling an already-enabled key is a no-op.
    pub async fn enable<F, Fut>(&self, key: K, fetch: F)
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, BackendError>> + Send,
    {
        let mut tasks = self.tasks.lock().await;

        // Expired loops leave finished handles behind; reap them here so the
        // map stays bounded by the live keys.
        tasks.retain(|_, task| !task.is_finished());

        if tasks.contains_key(&key) {
            return;
        }

        info!(?key, "Enabling polling");

        let entries = Arc::clone(&self.entries);
        let interval = self.interval;
        let idle_ttl = self.idle_ttl;
        let task_key = key.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                // No reader for a while: stop polling and drop the entry.
                // The next request for this key re-enables it.
                {
                    let mut entries = entries.write().await;
                    let idle = entries
                        .get(&task_key)
                        .map(|e| e.last_read.elapsed() > idle_ttl)
                        .unwrap_or(false);
                    if idle {
                        debug!(?task_key, "Polling expired; no recent readers");
                        entries.remove(&task_key);
                        return;
                    }
                }

                let seq = begin_fetch(&entries, &task_key).await;
                let result = fetch(task_key.clone()).await;
                complete_fetch(&entries, &task_key, seq, result).await;
            }
        });

        tasks.insert(key, handle);
    }

    /// Stop polling `key`. The cached value stays readable; an in-flight
    /// fetch is dropped, so its result can never apply.
    pub async fn disable(&self, key: &K) {
        let mut tasks = self.tasks.lock().await;
        if let Some(task) = tasks.remove(key) {
            info!(?key, "Disabling polling");
            task.abort();
        }
    }

    pub async fn is_enabled(&self, key: &K) -> bool {
        let tasks = self.tasks.lock().await;
        tasks.get(key).map(|t| !t.is_finished()).unwrap_or(false)
    }

    /// Current view of `key`: last good value plus loading/error flags.
    /// Reading a key counts as interest and resets its idle clock.
    pub async fn snapshot(&self, key: &K) -> CacheSnapshot<V> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) => {
                entry.last_read = Instant::now();
                CacheSnapshot {
                    data: entry.data.clone(),
                    is_loading: entry.issued_seq > entry.applied_seq,
                    is_error: entry.is_error,
                }
            }
            None => CacheSnapshot::default(),
        }
    }

    /// Record the issuance of a fetch for `key` and return its sequence
    /// number. The polling loop calls this right before fetching; it is
    /// public so the issuance/completion ordering can be driven directly.
    pub async fn begin_fetch(&self, key: &K) -> u64 {
        begin_fetch(&self.entries, key).await
    }

    /// Apply the result of the fetch issued as `seq`. Results for sequences
    /// at or below the last applied one are discarded (last-issued wins).
    pub async fn complete_fetch(&self, key: &K, seq: u64, result: Result<V, BackendError>) {
        complete_fetch(&self.entries, key, seq, result).await
    }
}

async fn begin_fetch<K, V>(entries: &RwLock<HashMap<K, Entry<V>>>, key: &K) -> u64
where
    K: Eq + Hash + Clone,
{
    let mut entries = entries.write().await;
    let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
    entry.issued_seq += 1;
    entry.issued_seq
}

async fn complete_fetch<K, V>(
    entries: &RwLock<HashMap<K, Entry<V>>>,
    key: &K,
    seq: u64,
    result: Result<V, BackendError>,
) where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    let mut entries = entries.write().await;
    let entry = entries.entry(key.clone()).or_insert_with(Entry::new);

    if seq <= entry.applied_seq {
        debug!(?key, seq, applied = entry.applied_seq, "Discarding stale fetch result");
        return;
    }

    entry.applied_seq = seq;
    match result {
        Ok(value) => {
            entry.data = Some(value);
            entry.is_error = false;
        }
        Err(e) => {
            // Keep the stale value; the flag tells the UI it is stale.
            debug!(?key, seq, "Fetch failed: {}", e);
            entry.is_error = true;
        }
    }
}
