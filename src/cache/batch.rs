use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::channel::oneshot;
use futures::future::{join_all, FutureExt, Shared};
use metrics::{counter, gauge};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::{LiteError, Result};

/// Canonical string identity of a cache key
pub trait CacheKey {
    fn cache_key(&self) -> String;
}

/// Resolves a batch of keys with one physical request.
///
/// Results are aligned with `keys` by position; each key succeeds or fails on
/// its own.
#[async_trait]
pub trait BatchLoader: Send + Sync + 'static {
    type Key: CacheKey + Clone + fmt::Debug + Send + Sync + 'static;
    type Value: Clone + Send + Sync + 'static;

    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn load(&self, keys: &[Self::Key]) -> Vec<Result<Self::Value>>;
}

type PendingResult<V> = Shared<oneshot::Receiver<Result<V>>>;

enum Slot<V> {
    Ready(V),
    Pending(PendingResult<V>),
}

struct Queued<K, V> {
    cache_key: String,
    key: K,
    reply: oneshot::Sender<Result<V>>,
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Memoized values
    pub entries: usize,
    /// Loads answered from memo or joined onto a pending load
    pub hits: u64,
    /// Loads that queued a new key
    pub misses: u64,
    /// Physical batches dispatched
    pub batches: u64,
}

struct Inner<L: BatchLoader> {
    loader: L,
    batch_size: usize,
    slots: DashMap<String, Slot<L::Value>>,
    queue: Mutex<Vec<Queued<L::Key, L::Value>>>,
    dispatch_scheduled: AtomicBool,
    hits: AtomicU64,
    misses: AtomicU64,
    batches: AtomicU64,
}

/// Memoizing batcher in front of a [`BatchLoader`].
///
/// Concurrent loads of one key share a single pending result. Keys queued before
/// the dispatcher gets its turn on the runtime go out together, split into
/// batches of at most `batch_size`. Successful values are kept for the lifetime
/// of the cache; failures are handed to their waiters and then forgotten, as
/// are loads whose dispatcher died before answering.
pub struct BatchedCache<L: BatchLoader> {
    inner: Arc<Inner<L>>,
}

impl<L: BatchLoader> Clone for BatchedCache<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: BatchLoader> BatchedCache<L> {
    pub fn new(loader: L, batch_size: NonZeroUsize) -> Self {
        Self {
            inner: Arc::new(Inner {
                loader,
                batch_size: batch_size.get(),
                slots: DashMap::new(),
                queue: Mutex::new(Vec::new()),
                dispatch_scheduled: AtomicBool::new(false),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                batches: AtomicU64::new(0),
            }),
        }
    }

    /// Load a value, joining an in-flight load of the same key if there is one
    pub async fn load(&self, key: L::Key) -> Result<L::Value> {
        let cache_key = key.cache_key();

        let pending = match self.inner.slots.entry(cache_key.clone()) {
            Entry::Occupied(entry) => match entry.get() {
                Slot::Ready(value) => {
                    self.inner.hits.fetch_add(1, Ordering::Relaxed);
                    counter!("lite_query.cache.hits", 1, "loader" => self.inner.loader.name());
                    return Ok(value.clone());
                }
                Slot::Pending(pending) => {
                    self.inner.hits.fetch_add(1, Ordering::Relaxed);
                    counter!("lite_query.cache.hits", 1, "loader" => self.inner.loader.name());
                    pending.clone()
                }
            },
            Entry::Vacant(entry) => {
                let (reply, receiver) = oneshot::channel();
                let pending = receiver.shared();
                entry.insert(Slot::Pending(pending.clone()));

                self.inner.misses.fetch_add(1, Ordering::Relaxed);
                counter!("lite_query.cache.misses", 1, "loader" => self.inner.loader.name());
                self.enqueue(Queued {
                    cache_key: cache_key.clone(),
                    key,
                    reply,
                });
                pending
            }
        };

        match pending.clone().await {
            Ok(result) => result,
            Err(oneshot::Canceled) => {
                // Forget the dead load so the next caller queues the key again.
                self.inner.slots.remove_if(&cache_key, |_, slot| {
                    matches!(slot, Slot::Pending(current) if current.ptr_eq(&pending))
                });
                Err(LiteError::Transport(format!(
                    "{} batch was dropped before completion",
                    self.inner.loader.name()
                )))
            }
        }
    }

    fn enqueue(&self, item: Queued<L::Key, L::Value>) {
        self.inner.queue.lock().push(item);

        if !self.inner.dispatch_scheduled.swap(true, Ordering::AcqRel) {
            let mut guard = DispatchGuard {
                inner: Arc::clone(&self.inner),
                armed: true,
            };
            tokio::spawn(async move {
                // Let every load issued in the current scheduling turn enqueue first.
                tokio::task::yield_now().await;
                guard.armed = false;
                Inner::dispatch(Arc::clone(&guard.inner)).await;
            });
        }
    }

    /// Whether a value for `key` is memoized
    pub fn contains(&self, key: &L::Key) -> bool {
        matches!(
            self.inner.slots.get(&key.cache_key()).as_deref(),
            Some(Slot::Ready(_))
        )
    }

    /// Number of memoized values
    pub fn len(&self) -> usize {
        self.inner
            .slots
            .iter()
            .filter(|slot| matches!(slot.value(), Slot::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> BatchStats {
        BatchStats {
            entries: self.len(),
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            batches: self.inner.batches.load(Ordering::Relaxed),
        }
    }
}

/// Releases the queue if a scheduled dispatcher is dropped before it runs
struct DispatchGuard<L: BatchLoader> {
    inner: Arc<Inner<L>>,
    armed: bool,
}

impl<L: BatchLoader> Drop for DispatchGuard<L> {
    fn drop(&mut self) {
        if self.armed {
            self.inner.abandon_queue();
        }
    }
}

impl<L: BatchLoader> Inner<L> {
    /// Drop every queued load; their waiters see the batch as dropped
    fn abandon_queue(&self) {
        let queued = {
            let mut queue = self.queue.lock();
            self.dispatch_scheduled.store(false, Ordering::Release);
            std::mem::take(&mut *queue)
        };
        if queued.is_empty() {
            return;
        }
        debug!(
            loader = self.loader.name(),
            keys = queued.len(),
            "dispatcher dropped before running, abandoning queued loads"
        );
        for item in queued {
            self.slots.remove(&item.cache_key);
        }
    }

    async fn dispatch(inner: Arc<Self>) {
        inner.dispatch_scheduled.store(false, Ordering::Release);
        let queued = std::mem::take(&mut *inner.queue.lock());
        if queued.is_empty() {
            return;
        }

        let mut batches = Vec::new();
        let mut items = queued.into_iter().peekable();
        while items.peek().is_some() {
            batches.push(items.by_ref().take(inner.batch_size).collect::<Vec<_>>());
        }

        debug!(
            loader = inner.loader.name(),
            batches = batches.len(),
            "dispatching cache batches"
        );
        join_all(batches.into_iter().map(|batch| inner.run_batch(batch))).await;
    }

    async fn run_batch(&self, batch: Vec<Queued<L::Key, L::Value>>) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        counter!("lite_query.cache.batches", 1, "loader" => self.loader.name());

        let keys: Vec<L::Key> = batch.iter().map(|item| item.key.clone()).collect();
        trace!(loader = self.loader.name(), ?keys, "loading batch");

        let mut results = self.loader.load(&keys).await;
        if results.len() != keys.len() {
            let error = LiteError::malformed(format!(
                "{} loader returned {} results for {} keys",
                self.loader.name(),
                results.len(),
                keys.len()
            ));
            results = keys.iter().map(|_| Err(error.clone())).collect();
        }

        for (item, result) in batch.into_iter().zip(results) {
            match &result {
                Ok(value) => {
                    self.slots.insert(item.cache_key, Slot::Ready(value.clone()));
                }
                Err(error) => {
                    debug!(loader = self.loader.name(), key = ?item.key, %error, "batched load failed");
                    self.slots.remove(&item.cache_key);
                }
            }
            // The caller may have stopped waiting; the memo is updated either way.
            let _ = item.reply.send(result);
        }

        gauge!(
            "lite_query.cache.entries",
            self.slots.len() as f64,
            "loader" => self.loader.name()
        );
    }
}
