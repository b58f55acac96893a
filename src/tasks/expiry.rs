//! Expiry Timer Task
//!
//! One-shot task that removes a single cache entry once its deadline passes.

use std::sync::Weak;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::trace;

// == Expire Trait ==
/// Something owning versioned entries that can be expired one at a time.
pub trait Expire<K>: Send + Sync {
    /// Removes the entry under `key` if it is still version `id`.
    fn expire(&self, key: &K, id: u64);
}

/// Spawns a timer that expires entry `id` under `key` at `deadline`.
///
/// The task holds only a weak reference to its owner: once the owner is
/// dropped the timer does nothing. A timer that fires after the entry was
/// replaced or cleared does nothing either.
///
/// # Returns
/// The task handle, or None when called outside a tokio runtime. Callers
/// then rely on expiry at lookup time.
pub fn spawn_expiry_timer<T, K>(
    owner: Weak<T>,
    key: K,
    id: u64,
    deadline: Instant,
) -> Option<JoinHandle<()>>
where
    T: Expire<K> + 'static,
    K: Send + 'static,
{
    let handle = Handle::try_current().ok()?;

    Some(handle.spawn(async move {
        tokio::time::sleep_until(deadline).await;

        match owner.upgrade() {
            Some(owner) => owner.expire(&key, id),
            None => trace!("Expiry timer fired after its owner was dropped"),
        }
    }))
}
