//! Memoize Options
//!
//! Per-function configuration: backing store, key derivation, max age.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheEntry, CacheStore, MemoryStore};
use crate::config::Config;
use crate::key::{derive_key, KeyArgs};

pub(crate) type KeyFn<A, K> = Arc<dyn Fn(&A) -> K + Send + Sync>;

pub(crate) type StoreRef<K, V> = Arc<dyn CacheStore<K, CacheEntry<V>>>;

// == Max Age ==
/// How long a result stays fresh.
pub enum MaxAge<A> {
    /// The same duration for every call
    Fixed(Duration),
    /// A duration computed from each call's arguments
    PerCall(Arc<dyn Fn(&A) -> Duration + Send + Sync>),
}

impl<A> MaxAge<A> {
    /// Resolves the duration for one call.
    pub fn resolve(&self, args: &A) -> Duration {
        match self {
            MaxAge::Fixed(duration) => *duration,
            MaxAge::PerCall(compute) => compute(args),
        }
    }
}

impl<A> Clone for MaxAge<A> {
    fn clone(&self) -> Self {
        match self {
            MaxAge::Fixed(duration) => MaxAge::Fixed(*duration),
            MaxAge::PerCall(compute) => MaxAge::PerCall(Arc::clone(compute)),
        }
    }
}

// == Options ==
/// Configuration for one memoized function.
///
/// `A` is the argument type, `V` the cached value type and `K` the cache
/// key type. Start from `Options::new()` for the structural key scheme
/// or from `Options::with_cache_key` for a custom one.
pub struct Options<A, V, K = String> {
    pub(crate) cache: StoreRef<K, V>,
    pub(crate) cache_key: KeyFn<A, K>,
    pub(crate) max_age: Option<MaxAge<A>>,
    pub(crate) name: Option<String>,
    pub(crate) expiry_timers: bool,
}

impl<A, V> Options<A, V, String>
where
    A: KeyArgs + 'static,
    V: Clone + Send + 'static,
{
    /// Options with the default key scheme, store and no max age.
    pub fn new() -> Self {
        Self::with_cache_key(|args: &A| derive_key(args))
    }

    /// Seeds options from process-wide defaults.
    pub fn from_config(config: &Config) -> Self {
        let mut options = Self::new();
        options.max_age = config.max_age().map(MaxAge::Fixed);
        options.expiry_timers = config.expiry_timers;
        options
    }
}

impl<A, V, K> Options<A, V, K>
where
    A: 'static,
    V: Clone + Send + 'static,
    K: Eq + Hash + Send + 'static,
{
    /// Options with a custom key function over the full argument value.
    ///
    /// The returned key is used verbatim. The default store is a fresh
    /// `MemoryStore` keyed by `K`.
    pub fn with_cache_key<F>(cache_key: F) -> Self
    where
        F: Fn(&A) -> K + Send + Sync + 'static,
    {
        Self {
            cache: Arc::new(MemoryStore::new()),
            cache_key: Arc::new(cache_key),
            max_age: None,
            name: None,
            expiry_timers: true,
        }
    }
}

impl<A, V> Default for Options<A, V, String>
where
    A: KeyArgs + 'static,
    V: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A, V, K> Options<A, V, K> {
    /// Replaces the backing store.
    pub fn cache<S>(mut self, store: Arc<S>) -> Self
    where
        S: CacheStore<K, CacheEntry<V>> + 'static,
    {
        self.cache = store;
        self
    }

    /// Expires every entry after `max_age`. Zero disables caching.
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(MaxAge::Fixed(max_age));
        self
    }

    /// Expires each entry after a duration computed from its arguments.
    pub fn max_age_with<F>(mut self, max_age: F) -> Self
    where
        F: Fn(&A) -> Duration + Send + Sync + 'static,
    {
        self.max_age = Some(MaxAge::PerCall(Arc::new(max_age)));
        self
    }

    /// Overrides the name recorded for introspection.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Enables or disables expiry timers. Expiry on lookup always applies.
    pub fn expiry_timers(mut self, enabled: bool) -> Self {
        self.expiry_timers = enabled;
        self
    }
}
