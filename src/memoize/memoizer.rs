//! Memoizer
//!
//! The engine behind every memoized function: key derivation, lookup with
//! expiry, versioned inserts and guarded deletes.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use parking_lot::{Mutex, ReentrantMutex};
use tracing::{debug, trace};

use crate::cache::{CacheEntry, CacheStats};
use crate::error::Result;
use crate::memoize::options::{KeyFn, MaxAge, Options, StoreRef};
use crate::memoize::MemoFuture;
use crate::registry::Registered;
use crate::tasks::{spawn_expiry_timer, Expire};

// == Memoizer ==
/// Cache state of one memoized function.
pub(crate) struct Memoizer<A, V, K> {
    name: String,
    store: StoreRef<K, V>,
    cache_key: KeyFn<A, K>,
    max_age: Option<MaxAge<A>>,
    expiry_timers: bool,
    /// Source of entry versions
    next_id: AtomicU64,
    stats: Mutex<CacheStats>,
    /// Held from an async miss until its pending future is stored.
    /// Reentrant so a function may call itself while building its future.
    in_flight: ReentrantMutex<()>,
}

impl<A, V, K> Memoizer<A, V, K>
where
    A: 'static,
    V: Clone + 'static,
    K: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a memoizer; `default_name` applies when the options carry none.
    pub(crate) fn new(options: Options<A, V, K>, default_name: &str) -> Self {
        Self {
            name: options.name.unwrap_or_else(|| default_name.to_string()),
            store: options.cache,
            cache_key: options.cache_key,
            max_age: options.max_age,
            expiry_timers: options.expiry_timers,
            next_id: AtomicU64::new(1),
            stats: Mutex::new(CacheStats::new()),
            in_flight: ReentrantMutex::new(()),
        }
    }

    pub(crate) fn key(&self, args: &A) -> K {
        (self.cache_key)(args)
    }

    fn max_age_for(&self, args: &A) -> Option<Duration> {
        self.max_age.as_ref().map(|max_age| max_age.resolve(args))
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    // == Lookup ==
    /// Returns the fresh value under `key`.
    ///
    /// A stale entry counts as a miss and is deleted on the spot, whether or
    /// not its timer has fired yet.
    pub(crate) fn lookup(&self, key: &K) -> Option<V> {
        match self.store.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.stats.lock().record_hit();
                Some(entry.value)
            }
            Some(entry) => {
                self.evict(key, entry.id);
                let mut stats = self.stats.lock();
                stats.record_expiration();
                stats.record_miss();
                trace!(memoized = %self.name, "Stale entry replaced on lookup");
                None
            }
            None => {
                self.stats.lock().record_miss();
                None
            }
        }
    }

    // == Insert ==
    /// Stores `value` under `key` and schedules its expiry.
    ///
    /// A zero max age stores nothing. Returns the id of the stored entry.
    pub(crate) fn insert(
        self: &Arc<Self>,
        key: K,
        value: V,
        max_age: Option<Duration>,
    ) -> Option<u64> {
        let id = self.next_id();
        self.insert_versioned(key, id, value, max_age)
    }

    fn insert_versioned(
        self: &Arc<Self>,
        key: K,
        id: u64,
        value: V,
        max_age: Option<Duration>,
    ) -> Option<u64> {
        if max_age == Some(Duration::ZERO) {
            trace!(memoized = %self.name, "Zero max age, result not cached");
            return None;
        }

        let entry = CacheEntry::new(value, id, max_age);
        let deadline = entry.expires_at;
        self.store.set(key.clone(), entry);

        if let Some(deadline) = deadline.filter(|_| self.expiry_timers) {
            if spawn_expiry_timer(Arc::downgrade(self), key, id, deadline).is_none() {
                trace!(memoized = %self.name, "No runtime for expiry timer, expiring on lookup");
            }
        }
        Some(id)
    }

    // == Evict ==
    /// Deletes the entry under `key` only if it is still version `id`.
    pub(crate) fn evict(&self, key: &K, id: u64) -> bool {
        match self.store.get(key) {
            Some(entry) if entry.id == id => self.store.delete(key),
            _ => false,
        }
    }

    /// Drops whatever is cached under `key` after a failed call.
    fn forget(&self, key: &K) {
        self.store.delete(key);
        self.stats.lock().record_failure();
        debug!(memoized = %self.name, "Call failed, cache entry removed");
    }

    // == Call ==
    /// Answers from the cache or computes and stores the result.
    pub(crate) fn call<F>(self: &Arc<Self>, args: A, func: F) -> V
    where
        F: FnOnce(A) -> V,
    {
        let key = self.key(&args);
        if let Some(value) = self.lookup(&key) {
            return value;
        }

        let max_age = self.max_age_for(&args);
        let value = func(args);
        self.insert(key, value.clone(), max_age);
        value
    }

    // == Try Call ==
    /// Like `call`, but an `Err` is never cached and is returned unchanged.
    pub(crate) fn try_call<E, F>(self: &Arc<Self>, args: A, func: F) -> std::result::Result<V, E>
    where
        F: FnOnce(A) -> std::result::Result<V, E>,
    {
        let key = self.key(&args);
        if let Some(value) = self.lookup(&key) {
            return Ok(value);
        }

        let max_age = self.max_age_for(&args);
        match func(args) {
            Ok(value) => {
                self.insert(key, value.clone(), max_age);
                Ok(value)
            }
            Err(err) => {
                self.forget(&key);
                Err(err)
            }
        }
    }

    pub(crate) fn stats(&self) -> CacheStats {
        self.stats.lock().clone()
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn clear(&self) -> Result<()> {
        self.store.clear()?;
        debug!(memoized = %self.name, "Cache cleared");
        Ok(())
    }
}

impl<A, T, E, K> Memoizer<A, MemoFuture<T, E>, K>
where
    A: 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    K: Clone + Send + Sync + 'static,
{
    // == Call Async ==
    /// Answers from the cache or starts the computation.
    ///
    /// The pending future is stored before this returns, so every call that
    /// arrives before it settles shares the same computation. A failed
    /// computation deletes its own entry before any caller sees the error.
    ///
    /// Lookup, creation of the future and its insert form one critical
    /// section, so calls racing in from other threads cannot each miss.
    pub(crate) fn call_async<Fut, F>(self: &Arc<Self>, args: A, func: F) -> MemoFuture<T, E>
    where
        F: FnOnce(A) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
    {
        let _in_flight = self.in_flight.lock();
        let key = self.key(&args);
        if let Some(pending) = self.lookup(&key) {
            return pending;
        }

        let max_age = self.max_age_for(&args);
        let id = self.next_id();
        let memoizer = Arc::downgrade(self);
        let guarded_key = key.clone();
        let computation = func(args);

        let shared = async move {
            let outcome = computation.await;
            if outcome.is_err() {
                if let Some(memoizer) = memoizer.upgrade() {
                    memoizer.evict(&guarded_key, id);
                    memoizer.stats.lock().record_failure();
                    debug!(memoized = %memoizer.name, "Computation failed, cache entry removed");
                }
            }
            outcome
        }
        .boxed()
        .shared();

        self.insert_versioned(key, id, shared.clone(), max_age);
        shared
    }
}

impl<A, V, K> Expire<K> for Memoizer<A, V, K>
where
    A: 'static,
    V: Clone + 'static,
    K: Clone + Send + Sync + 'static,
{
    fn expire(&self, key: &K, id: u64) {
        if self.evict(key, id) {
            self.stats.lock().record_expiration();
            trace!(memoized = %self.name, "Expiry timer removed entry");
        }
    }
}

impl<A, V, K> Registered for Memoizer<A, V, K>
where
    A: 'static,
    V: Clone + 'static,
    K: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        Memoizer::name(self)
    }

    fn stats(&self) -> CacheStats {
        Memoizer::stats(self)
    }

    fn clear(&self) -> Result<()> {
        Memoizer::clear(self)
    }
}
