//! Memory Store Module
//!
//! Default clearable backing store: a HashMap behind a mutex.

use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::Mutex;

use crate::cache::CacheStore;
use crate::error::Result;

// == Memory Store ==
/// Clearable in-memory store keyed by structural equality.
#[derive(Debug)]
pub struct MemoryStore<K, V> {
    /// Key-value storage
    entries: Mutex<HashMap<K, V>>,
}

impl<K, V> MemoryStore<K, V> {
    // == Constructor ==
    /// Creates a new empty MemoryStore.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    // == Length ==
    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    // == Is Empty ==
    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<K: Clone, V> MemoryStore<K, V> {
    // == Keys ==
    /// Returns a snapshot of the stored keys, in no particular order.
    pub fn keys(&self) -> Vec<K> {
        self.entries.lock().keys().cloned().collect()
    }
}

impl<K, V> Default for MemoryStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> CacheStore<K, V> for MemoryStore<K, V>
where
    K: Eq + Hash + Send,
    V: Clone + Send,
{
    fn get(&self, key: &K) -> Option<V> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: K, value: V) {
        self.entries.lock().insert(key, value);
    }

    fn has(&self, key: &K) -> bool {
        self.entries.lock().contains_key(key)
    }

    fn delete(&self, key: &K) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    fn clear(&self) -> Result<()> {
        self.entries.lock().clear();
        Ok(())
    }
}
