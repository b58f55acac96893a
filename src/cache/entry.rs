//! Cache Entry Module
//!
//! Defines the record stored for one memoized call, with TTL support.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// Represents a single memoized result with its metadata.
///
/// Entries are never mutated after insertion; a recomputation replaces the
/// entry under the same key with a fresh one carrying a new `id`.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored result (a shared future for async functions)
    pub value: V,
    /// Version of this entry, unique per memoized function
    pub id: u64,
    /// Creation instant
    pub created_at: Instant,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry with optional max age.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `id` - Version stamp used to guard timer deletions
    /// * `max_age` - Optional duration after which the entry is stale. A
    ///   deadline past the clock's range means the entry never expires.
    pub fn new(value: V, id: u64, max_age: Option<Duration>) -> Self {
        let now = Instant::now();
        Self {
            value,
            id,
            created_at: now,
            expires_at: max_age.and_then(|age| now.checked_add(age)),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or equal to
    /// its expiration instant, whether or not its timer has fired yet.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Checks expiry against a given instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining time to live, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired
    /// - `Some(remaining)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = CacheEntry::new("test_value", 1, None);

        assert_eq!(entry.value, "test_value");
        assert_eq!(entry.id, 1);
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
        assert!(entry.ttl_remaining().is_none());
    }

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = CacheEntry::new("test_value", 1, Some(Duration::from_secs(60)));

        assert!(entry.expires_at.is_some());
        assert!(!entry.is_expired());

        let remaining = entry.ttl_remaining().unwrap();
        assert!(remaining <= Duration::from_secs(60));
        assert!(remaining >= Duration::from_secs(59));
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let entry = CacheEntry::new(0, 1, Some(Duration::ZERO));

        assert!(entry.is_expired(), "Entry should be expired at boundary");
        assert_eq!(entry.ttl_remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_unrepresentable_ttl_never_expires() {
        let entry = CacheEntry::new(0, 1, Some(Duration::MAX));

        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
        assert!(entry.ttl_remaining().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expiration() {
        let entry = CacheEntry::new(7, 1, Some(Duration::from_millis(100)));

        tokio::time::advance(Duration::from_millis(99)).await;
        assert!(!entry.is_expired());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(entry.is_expired());
        assert_eq!(entry.ttl_remaining(), Some(Duration::ZERO));
    }
}
