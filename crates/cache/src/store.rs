//! The cache store boundary consumed by the caching combinators.
//!
//! Backing implementations are interchangeable; the in-process
//! [`MemoryCache`] is the default, a distributed store can be slotted in
//! by implementing [`CacheStore`] for it.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Get/set/delete with a per-entry TTL.
///
/// Implementations must be safe under concurrent access from independent
/// request-handling threads.
pub trait CacheStore: Send + Sync {
    /// Look up a live entry. Expired entries count as absent.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store an entry that turns stale after `ttl`.
    fn set(&self, key: &str, value: Value, ttl: Duration);

    /// Drop an entry, if present.
    fn delete(&self, key: &str);
}

struct Entry {
    value: Value,
    expires_at: Instant,
}

/// In-process cache backed by a mutexed map with lazy expiry: stale
/// entries are dropped when read, not by a sweeper.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        MemoryCache::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        // A poisoned lock only means another thread panicked mid-insert;
        // the map itself is still a valid cache.
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                tracing::debug!(key, "cache hit");
                Some(entry.value.clone())
            }
            Some(_) => {
                tracing::debug!(key, "cache entry expired");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: Value, ttl: Duration) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.lock().insert(key.to_string(), entry);
    }

    fn delete(&self, key: &str) {
        if self.lock().remove(key).is_some() {
            tracing::debug!(key, "cache entry evicted");
        }
    }
}

/// A cache store that never stores anything: every read misses.
#[derive(Debug, Default)]
pub struct NoCache;

impl CacheStore for NoCache {
    fn get(&self, _key: &str) -> Option<Value> {
        None
    }

    fn set(&self, _key: &str, _value: Value, _ttl: Duration) {}

    fn delete(&self, _key: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_then_get_returns_the_value() {
        let cache = MemoryCache::new();
        cache.set("k", json!({"a": 1}), Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(json!({"a": 1})));
    }

    #[test]
    fn expired_entries_count_as_absent() {
        let cache = MemoryCache::new();
        cache.set("k", json!(1), Duration::ZERO);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn delete_drops_the_entry() {
        let cache = MemoryCache::new();
        cache.set("k", json!(1), Duration::from_secs(60));
        cache.delete("k");
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn null_is_a_storable_value_distinct_from_absence() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("k"), None);
        cache.set("k", Value::Null, Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(Value::Null));
    }

    #[test]
    fn no_cache_never_stores() {
        let cache = NoCache;
        cache.set("k", json!(1), Duration::from_secs(60));
        assert_eq!(cache.get("k"), None);
    }
}
