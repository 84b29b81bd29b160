//! TTL cache with lazy eviction.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::policy::{MAX_TTL, TtlPolicy, check_ttl};

/// Entry stored in the cache.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// Cached value.
    pub value: V,

    /// When this entry was written.
    pub inserted_at: Instant,

    /// Instant after which the entry is treated as absent.
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    /// Create a new entry that expires `ttl` from now.
    ///
    /// TTLs too large to represent are clamped to [`MAX_TTL`].
    pub fn new(value: V, ttl: Duration) -> Self {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .or_else(|| now.checked_add(MAX_TTL))
            .unwrap_or(now);
        Self {
            value,
            inserted_at: now,
            expires_at,
        }
    }

    /// Check whether the entry has expired as of `now`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    /// Check whether the entry has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}

/// Inner state protected by the cache mutex.
struct CacheInner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    policy: TtlPolicy,
}

/// In-memory key/value cache where every entry carries its own expiry.
///
/// The TTL for an entry is chosen from the [`TtlPolicy`] by data category at
/// write time. Reads never return an expired entry: a stale entry found on
/// `get` is removed in the same critical section. Cloning the cache yields
/// another handle to the same storage.
pub struct TtlCache<V> {
    inner: Arc<Mutex<CacheInner<V>>>,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache with the given TTL policy.
    pub fn new(policy: TtlPolicy) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner {
                entries: HashMap::new(),
                policy,
            })),
        }
    }

    /// Create a cache with the built-in category TTLs.
    pub fn with_defaults() -> Self {
        Self::new(TtlPolicy::default())
    }

    /// Get a value if present and not expired.
    ///
    /// An expired entry is removed before returning `None`.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.lock();
        match inner.entries.get(key) {
            None => {
                trace!(key = %key, "Cache miss");
                return None;
            }
            Some(entry) if !entry.is_expired() => {
                trace!(key = %key, "Cache hit");
                return Some(entry.value.clone());
            }
            Some(_) => {}
        }

        inner.entries.remove(key);
        debug!(key = %key, "Cache entry expired, removed");
        None
    }

    /// Check if a key is present and unexpired, without evicting.
    pub fn contains(&self, key: &str) -> bool {
        let inner = self.inner.lock();
        inner
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired())
    }

    /// Store a value using the TTL configured for `category`.
    ///
    /// Any prior entry for the key is replaced and its expiry reset.
    pub fn set(&self, key: impl Into<String>, value: V, category: &str) {
        let key = key.into();
        let mut inner = self.inner.lock();
        let ttl = inner.policy.ttl_for(category);
        trace!(
            key = %key,
            category = %category,
            ttl_secs = ttl.as_secs(),
            "Cache entry stored"
        );
        inner.entries.insert(key, CacheEntry::new(value, ttl));
    }

    /// Store a value with an explicit TTL, bypassing the category policy.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) -> Result<()> {
        let key = key.into();
        check_ttl(&key, ttl)?;
        let mut inner = self.inner.lock();
        inner.entries.insert(key, CacheEntry::new(value, ttl));
        Ok(())
    }

    /// Remove a key. Removing an absent key is not an error.
    pub fn delete(&self, key: &str) {
        let mut inner = self.inner.lock();
        if inner.entries.remove(key).is_some() {
            trace!(key = %key, "Cache entry deleted");
        }
    }

    /// Remove every expired entry and return how many were removed.
    pub fn cleanup(&self) -> usize {
        let mut inner = self.inner.lock();
        let now = Instant::now();
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - inner.entries.len();

        if removed > 0 {
            debug!(count = removed, "Cleaned up expired cache entries");
        }

        removed
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    /// Update the TTL for a category. Entries already stored keep their expiry.
    pub fn set_ttl(&self, category: &str, ttl: Duration) -> Result<()> {
        self.inner.lock().policy.set(category, ttl)
    }

    /// Update the TTL for a category from a signed number of seconds.
    pub fn set_ttl_secs(&self, category: &str, seconds: i64) -> Result<()> {
        if seconds <= 0 {
            return Err(Error::InvalidArgument(format!(
                "TTL for category '{}' must be positive, got {}",
                category, seconds
            )));
        }
        self.set_ttl(category, Duration::from_secs(seconds as u64))
    }

    /// TTL currently applied to a category.
    pub fn ttl_for(&self, category: &str) -> Duration {
        self.inner.lock().policy.ttl_for(category)
    }

    /// Snapshot of the current policy.
    pub fn policy(&self) -> TtlPolicy {
        self.inner.lock().policy.clone()
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Check if the cache holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let now = Instant::now();
        let total = inner.entries.len();
        let expired = inner
            .entries
            .values()
            .filter(|entry| entry.is_expired_at(now))
            .count();

        CacheStats {
            total,
            expired,
            active: total - expired,
            policy: inner.policy.to_secs(),
        }
    }
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("TtlCache")
            .field("entries", &inner.entries.len())
            .field("policy", &inner.policy)
            .finish()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of stored entries.
    pub total: usize,

    /// Entries past their expiry that have not been evicted yet.
    pub expired: usize,

    /// Entries still servable.
    pub active: usize,

    /// TTL per category in seconds.
    pub policy: BTreeMap<String, u64>,
}
