//! Cache Module
//!
//! Backing stores for memoized functions: the `CacheStore` capability trait,
//! a clearable in-memory store and an identity-keyed weak store.

mod entry;
mod stats;
mod store;
mod weak;

// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::MemoryStore;
pub use weak::WeakStore;

use crate::error::{MemoizeError, Result};

// == Cache Store Trait ==
/// A mapping from cache keys to values, shared between a memoized function
/// and its expiry timers.
///
/// Implementations lock internally so every operation takes `&self`.
pub trait CacheStore<K, V>: Send + Sync {
    /// Returns a copy of the value stored under `key`.
    fn get(&self, key: &K) -> Option<V>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: K, value: V);

    /// Returns true if a value is stored under `key`.
    fn has(&self, key: &K) -> bool;

    /// Removes the value under `key`. Returns true if one was present.
    fn delete(&self, key: &K) -> bool;

    /// Removes every value.
    ///
    /// Stores without a clear capability keep the default, which reports
    /// `MemoizeError::Unsupported`.
    fn clear(&self) -> Result<()> {
        Err(MemoizeError::Unsupported)
    }
}
