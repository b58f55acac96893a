//! Weak Store Module
//!
//! Identity-keyed store that holds its keys weakly. Values stored for an
//! object are unreachable once the object is dropped and are pruned on the
//! next insert. The store cannot be cleared or iterated.

use std::collections::HashMap;
use std::sync::Weak;

use parking_lot::Mutex;
use tracing::trace;

use crate::cache::CacheStore;
use crate::key::Ref;

// == Weak Store ==
/// Store keyed by `Ref` identity.
pub struct WeakStore<T: ?Sized, V> {
    /// Entries by identity, with a weak handle on the key object
    entries: Mutex<HashMap<u64, (Weak<T>, V)>>,
}

impl<T: ?Sized, V> WeakStore<T, V> {
    // == Constructor ==
    /// Creates a new empty WeakStore.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn prune(entries: &mut HashMap<u64, (Weak<T>, V)>) {
        let before = entries.len();
        entries.retain(|_, (owner, _)| owner.strong_count() > 0);
        let pruned = before - entries.len();
        if pruned > 0 {
            trace!("Weak store pruned {} entries of dropped keys", pruned);
        }
    }
}

impl<T: ?Sized, V> Default for WeakStore<T, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, V> CacheStore<Ref<T>, V> for WeakStore<T, V>
where
    T: ?Sized + Send + Sync,
    V: Clone + Send,
{
    fn get(&self, key: &Ref<T>) -> Option<V> {
        let entries = self.entries.lock();
        entries
            .get(&key.id())
            .filter(|(owner, _)| owner.strong_count() > 0)
            .map(|(_, value)| value.clone())
    }

    fn set(&self, key: Ref<T>, value: V) {
        let mut entries = self.entries.lock();
        Self::prune(&mut entries);
        entries.insert(key.id(), (key.downgrade(), value));
    }

    fn has(&self, key: &Ref<T>) -> bool {
        self.entries
            .lock()
            .get(&key.id())
            .is_some_and(|(owner, _)| owner.strong_count() > 0)
    }

    fn delete(&self, key: &Ref<T>) -> bool {
        self.entries.lock().remove(&key.id()).is_some()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MemoizeError;

    #[test]
    fn test_weak_store_keys_by_identity() {
        let store = WeakStore::new();
        let foo = Ref::new(());
        let bar = Ref::new(());

        store.set(foo.clone(), 1);

        assert_eq!(store.get(&foo), Some(1));
        assert!(store.has(&foo));
        assert!(!store.has(&bar));
    }

    #[test]
    fn test_weak_store_delete() {
        let store = WeakStore::new();
        let foo = Ref::new("foo");

        store.set(foo.clone(), 1);
        assert!(store.delete(&foo));
        assert!(!store.delete(&foo));
        assert_eq!(store.get(&foo), None);
    }

    #[test]
    fn test_weak_store_cannot_be_cleared() {
        let store: WeakStore<u8, u8> = WeakStore::new();
        assert_eq!(store.clear(), Err(MemoizeError::Unsupported));
    }

    #[test]
    fn test_weak_store_prunes_dropped_keys() {
        let store = WeakStore::new();
        let foo = Ref::new(1);
        let bar = Ref::new(2);

        store.set(foo.clone(), "foo");
        drop(foo);

        // The next insert drops the orphaned entry
        store.set(bar.clone(), "bar");
        assert_eq!(store.entries.lock().len(), 1);
        assert_eq!(store.get(&bar), Some("bar"));
    }
}
