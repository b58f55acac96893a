//! Registry & Clear Protocol
//!
//! Associates each memoized function with its cache so the cache can be
//! cleared or inspected through the function alone. The registry holds weak
//! handles only and never keeps a function or its cache alive.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::trace;

use crate::cache::CacheStats;
use crate::error::{MemoizeError, Result};

/// Cache state reachable through the registry.
pub(crate) trait Registered: Send + Sync {
    fn name(&self) -> &str;
    fn stats(&self) -> CacheStats;
    fn clear(&self) -> Result<()>;
}

/// Memoized functions by the address of their `Arc` allocation.
static REGISTRY: Lazy<Mutex<HashMap<usize, Weak<dyn Registered>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn identity<F: ?Sized>(func: &Arc<F>) -> usize {
    Arc::as_ptr(func) as *const () as usize
}

/// Records `memoizer` as the cache behind `func`.
pub(crate) fn register<F: ?Sized>(func: &Arc<F>, memoizer: Weak<dyn Registered>) {
    let mut registry = REGISTRY.lock();
    // Entries of dropped functions are dead weight; their addresses may be
    // reused by new allocations
    registry.retain(|_, entry| entry.strong_count() > 0);
    registry.insert(identity(func), memoizer);
    trace!(registered = registry.len(), "Memoized function registered");
}

fn lookup<F: ?Sized>(func: &Arc<F>) -> Result<Arc<dyn Registered>> {
    REGISTRY
        .lock()
        .get(&identity(func))
        .and_then(Weak::upgrade)
        .ok_or(MemoizeError::InvalidArgument)
}

// == Clear ==
/// Removes every cached result of a memoized function.
///
/// # Errors
/// - `MemoizeError::InvalidArgument` if `func` was not produced by one of
///   the memoize functions
/// - `MemoizeError::Unsupported` if its store cannot be cleared
pub fn clear<F: ?Sized>(func: &Arc<F>) -> Result<()> {
    lookup(func)?.clear()
}

/// Returns the name recorded for a memoized function.
pub fn name_of<F: ?Sized>(func: &Arc<F>) -> Result<String> {
    Ok(lookup(func)?.name().to_string())
}

/// Returns the cache statistics of a memoized function.
pub fn stats_of<F: ?Sized>(func: &Arc<F>) -> Result<CacheStats> {
    Ok(lookup(func)?.stats())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        cleared: Mutex<u32>,
        clearable: bool,
    }

    impl Registered for Fixture {
        fn name(&self) -> &str {
            "fixture"
        }

        fn stats(&self) -> CacheStats {
            CacheStats::new()
        }

        fn clear(&self) -> Result<()> {
            if !self.clearable {
                return Err(MemoizeError::Unsupported);
            }
            *self.cleared.lock() += 1;
            Ok(())
        }
    }

    fn fixture(clearable: bool) -> Arc<Fixture> {
        Arc::new(Fixture {
            cleared: Mutex::new(0),
            clearable,
        })
    }

    #[test]
    fn test_unregistered_function_is_rejected() {
        let plain: Arc<dyn Fn() + Send + Sync> = Arc::new(|| {});

        assert_eq!(clear(&plain), Err(MemoizeError::InvalidArgument));
        assert_eq!(name_of(&plain), Err(MemoizeError::InvalidArgument));
    }

    #[test]
    fn test_clear_reaches_registered_cache() {
        let func: Arc<dyn Fn() -> u8 + Send + Sync> = Arc::new(|| 1);
        let cache = fixture(true);
        let weak: Weak<dyn Registered> = Arc::downgrade(&cache) as Weak<dyn Registered>;
        register(&func, weak);

        assert_eq!(clear(&func), Ok(()));
        assert_eq!(*cache.cleared.lock(), 1);
        assert_eq!(name_of(&func).unwrap(), "fixture");

        // Clones of the function share its identity
        assert_eq!(clear(&Arc::clone(&func)), Ok(()));
        assert_eq!(*cache.cleared.lock(), 2);
    }

    #[test]
    fn test_unclearable_cache_is_reported() {
        let func: Arc<dyn Fn() -> u8 + Send + Sync> = Arc::new(|| 2);
        let cache = fixture(false);
        let weak: Weak<dyn Registered> = Arc::downgrade(&cache) as Weak<dyn Registered>;
        register(&func, weak);

        assert_eq!(clear(&func), Err(MemoizeError::Unsupported));
    }

    #[test]
    fn test_dropped_cache_is_not_memoized() {
        let func: Arc<dyn Fn() -> u8 + Send + Sync> = Arc::new(|| 3);
        let cache = fixture(true);
        let weak: Weak<dyn Registered> = Arc::downgrade(&cache) as Weak<dyn Registered>;
        register(&func, weak);
        drop(cache);

        assert_eq!(clear(&func), Err(MemoizeError::InvalidArgument));
    }
}
