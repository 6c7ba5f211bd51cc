//! Conditional caching and invalidation combinators for RPC reads.
//!
//! These are explicit higher-order functions rather than annotations:
//! a read operation threads its fetch and converter through [`cached`],
//! a mutation computes the keys of the reads it staled and hands them to
//! [`evict`].

use serde_json::Value;
use std::time::Duration;

use crate::store::CacheStore;

/// Wrap one idempotent read with the cache.
///
/// Entries hold the raw RPC result; `convert` re-runs on every hit
/// (converters are pure, so this is observably the same as caching the
/// converted value). A raw `null` — the backend's "nothing found" — maps
/// to `Ok(None)` and is itself cacheable, so repeated lookups of data the
/// backend has not (yet) indexed do not re-issue the call.
///
/// `should_store` sees the converted result after a miss and decides
/// whether it is worth keeping; call sites use it to skip entries that
/// are about to change or to deliberately pin not-found results.
pub fn cached<T, E>(
    cache: &dyn CacheStore,
    key: &str,
    ttl: Duration,
    should_store: impl FnOnce(Option<&T>) -> bool,
    convert: impl Fn(&Value) -> Result<T, E>,
    fetch: impl FnOnce() -> Result<Value, E>,
) -> Result<Option<T>, E> {
    if let Some(raw) = cache.get(key) {
        return match raw {
            Value::Null => Ok(None),
            raw => convert(&raw).map(Some),
        };
    }
    let raw = fetch()?;
    let converted = match &raw {
        Value::Null => None,
        raw => Some(convert(raw)?),
    };
    if should_store(converted.as_ref()) {
        cache.set(key, raw, ttl);
    }
    Ok(converted)
}

/// Evict the entries of related reads after a mutation.
pub fn evict(cache: &dyn CacheStore, keys: &[String]) {
    for key in keys {
        cache.delete(key);
    }
}
